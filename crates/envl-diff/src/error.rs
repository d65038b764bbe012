//! Error types for the diff crate.

use envl_core::EnvelopeError;
use envl_types::Digest;

/// A diff envelope that cannot be applied to the given source.
///
/// This is the only failure mode of patching; each variant names the reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidDiff {
    /// An entry's tag is not one of `add`, `delete`, `edit`.
    #[error("invalid diff: unrecognized entry tag {0:?}")]
    UnknownTag(String),

    /// An entry's subject is not an assertion, so it carries no tag.
    #[error("invalid diff: entry has no tag")]
    Untagged,

    /// A `delete` or `edit` entry references an assertion absent from the source.
    #[error("invalid diff: no assertion with digest {0:?} in source")]
    MissingAssertion(Digest),

    /// An `edit` subject references neither the source nor its subject.
    #[error("invalid diff: edit references {referenced:?} but source is {actual:?}")]
    EditTargetMismatch { referenced: Digest, actual: Digest },

    /// A predicate/object edit was applied to something that is not an
    /// assertion, or an entry produced a non-assertion for an assertion set.
    #[error("invalid diff: expected an assertion")]
    NotAnAssertion,

    /// An entry or sub-entry could not be parsed.
    #[error("invalid diff: malformed entry: {0}")]
    Malformed(#[from] EnvelopeError),

    /// The diff nests deeper than the configured limit.
    #[error("invalid diff: nesting exceeds depth limit of {0}")]
    DepthExceeded(usize),
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, InvalidDiff>;
