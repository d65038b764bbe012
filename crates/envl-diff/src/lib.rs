//! Structural diff and patch for envl envelopes.
//!
//! A diff is itself an envelope: a compact description of how to turn a
//! source envelope into a target. Computing one never fails; applying one
//! checks it against the source and either produces the target or rejects
//! the diff as [`InvalidDiff`].
//!
//! # Key Types
//!
//! - [`DiffEngine`] -- computes diffs, pairing changed assertions greedily
//! - [`PatchEngine`] / [`PatchOp`] -- validates and applies diffs
//! - [`DiffSummary`] -- entry counts of a diff
//! - [`DiffConfig`] -- recursion limit shared by both engines
//! - [`EnvelopeDiff`] -- `diff`/`apply_diff` as envelope methods
//!
//! # Guarantees
//!
//! A diff computed under a [`DiffConfig`] applies under the same config:
//! `PatchEngine::with_config(c).apply(a, &DiffEngine::with_config(c).diff(a, b))`
//! is `Ok(b)` for any `a` and `b` free of the literals [`vocab`] reserves,
//! however deeply nested. Both engines count depth identically, and at the
//! limit the diff replaces whole subtrees instead of descending into them.
//!
//! `diff(a, a)` is the `noChange` sentinel, and diffs depend only on envelope
//! content, never on how an envelope was built.

pub mod config;
pub mod engine;
pub mod error;
mod matcher;
pub mod patch;
pub mod summary;
pub mod vocab;

pub use config::DiffConfig;
pub use engine::{wholesale, DiffEngine};
pub use error::{InvalidDiff, PatchResult};
pub use patch::{PatchEngine, PatchOp};
pub use summary::DiffSummary;

use envl_core::Envelope;

/// Compute the diff from `source` to `target` with the default configuration.
pub fn diff(source: &Envelope, target: &Envelope) -> Envelope {
    DiffEngine::new().diff(source, target)
}

/// Apply `diff` to `source` with the default configuration.
pub fn apply_diff(source: &Envelope, diff: &Envelope) -> PatchResult<Envelope> {
    PatchEngine::new().apply(source, diff)
}

/// Diff and patch as methods on [`Envelope`].
pub trait EnvelopeDiff {
    /// The diff that transforms `self` into `target`.
    fn diff(&self, target: &Envelope) -> Envelope;

    /// Apply a diff produced against `self`.
    fn apply_diff(&self, diff: &Envelope) -> PatchResult<Envelope>;
}

impl EnvelopeDiff for Envelope {
    fn diff(&self, target: &Envelope) -> Envelope {
        diff(self, target)
    }

    fn apply_diff(&self, diff: &Envelope) -> PatchResult<Envelope> {
        apply_diff(self, diff)
    }
}
