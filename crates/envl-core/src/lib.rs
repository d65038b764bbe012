//! Immutable, content-addressed envelope trees.
//!
//! An envelope is a tree of digest-identified nodes. Every envelope is one of
//! a closed set of cases: a subject with an assertion set, a leaf value, a
//! wrapped envelope, a known predicate, a predicate/object assertion, or an
//! obscured stand-in (encrypted or elided) that keeps the digest of the
//! content it hides.
//!
//! # Key Types
//!
//! - [`Envelope`] -- cheaply clonable handle; equality is digest equality
//! - [`EnvelopeCase`] -- the closed sum of envelope shapes
//! - [`LeafValue`] / [`FromLeaf`] -- leaf payloads and typed extraction
//! - [`EnvelopeRepr`] -- JSON interchange form
//!
//! # Design Rules
//!
//! 1. Envelopes are never mutated; edits return new values sharing subtrees.
//! 2. Assertion sets are keyed by digest, so duplicates collapse and
//!    iteration order is the digest order.
//! 3. Obscured envelopes compare equal to the content they stand in for.

pub mod codec;
pub mod edit;
pub mod envelope;
pub mod error;
pub mod leaf;

pub use codec::EnvelopeRepr;
pub use envelope::{Assertion, EncryptedMessage, Envelope, EnvelopeCase};
pub use error::{EnvelopeError, EnvelopeResult};
pub use leaf::{FromLeaf, LeafValue};

pub use envl_types::{Digest, KnownPredicate};
