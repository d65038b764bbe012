//! Digest derivation for envl envelopes.
//!
//! Provides domain-separated BLAKE3 hashing. Each envelope case hashes under
//! its own domain so that, for example, a leaf and a wrapper over identical
//! bytes never share a digest.
//!
//! Hashing is delegated to the `blake3` crate.

pub mod hasher;

pub use hasher::DigestHasher;
