use envl_types::Digest;

/// Errors from envelope construction, lookup, and extraction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// An envelope that is not assertion-shaped was used as an assertion,
    /// or a decoded envelope violates a structural rule.
    #[error("invalid envelope format: {0}")]
    InvalidFormat(String),

    /// No assertion carries the requested predicate.
    #[error("no assertion with the requested predicate")]
    NonexistentPredicate,

    /// More than one assertion carries the requested predicate.
    #[error("more than one assertion with the requested predicate")]
    AmbiguousPredicate,

    /// No assertion with the given digest.
    #[error("no assertion with digest {0:?}")]
    NonexistentAssertion(Digest),

    /// The envelope's subject is not a wrapped envelope.
    #[error("envelope is not wrapped")]
    NotWrapped,

    /// The subject is not a leaf of the expected type.
    #[error("subject is not a {expected} leaf")]
    InvalidLeaf { expected: &'static str },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for envelope operations.
pub type EnvelopeResult<T> = Result<T, EnvelopeError>;
