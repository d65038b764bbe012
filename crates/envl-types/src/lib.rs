//! Foundation types for envl envelopes.
//!
//! Every other envl crate depends on `envl-types`. It holds the identifiers
//! that envelopes are built from and compared by.
//!
//! # Key Types
//!
//! - [`Digest`] -- BLAKE3 digest every envelope commits to
//! - [`KnownPredicate`] -- Compact numeric stand-in for a common predicate

pub mod digest;
pub mod error;
pub mod known;

pub use digest::{Digest, DIGEST_LEN};
pub use error::TypeError;
pub use known::KnownPredicate;
