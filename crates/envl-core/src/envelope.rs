//! The envelope value type.
//!
//! An [`Envelope`] is an immutable, reference-counted handle over an
//! [`EnvelopeCase`]. Cloning is cheap and shares every subtree, so edits
//! that produce a new envelope reuse all unchanged children.
//!
//! # Invariants
//!
//! - Every envelope carries its digest; equality, hashing, and ordering use
//!   the digest only.
//! - A node's subject is never itself a node.
//! - A node always has at least one assertion; removing the last one
//!   collapses the node to its subject.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::sync::Arc;

use envl_crypto::DigestHasher;
use envl_types::{Digest, KnownPredicate};
use serde::{Deserialize, Serialize};

use crate::error::{EnvelopeError, EnvelopeResult};
use crate::leaf::{FromLeaf, LeafValue};

/// The closed set of envelope shapes.
#[derive(Clone, Debug)]
pub enum EnvelopeCase {
    /// A subject with an unordered, digest-keyed set of assertions.
    Node {
        subject: Envelope,
        assertions: BTreeMap<Digest, Envelope>,
        digest: Digest,
    },
    /// An opaque encoded value.
    Leaf { value: LeafValue, digest: Digest },
    /// A nested envelope treated as an opaque subject.
    Wrapped { envelope: Envelope, digest: Digest },
    /// A compact identifier standing in for a predicate.
    KnownPredicate {
        value: KnownPredicate,
        digest: Digest,
    },
    /// A predicate/object pair.
    Assertion(Assertion),
    /// Ciphertext standing in for a plaintext subtree.
    Encrypted(EncryptedMessage),
    /// A digest-only placeholder.
    Elided(Digest),
}

/// A predicate/object pair of envelopes.
#[derive(Clone, Debug)]
pub struct Assertion {
    predicate: Envelope,
    object: Envelope,
    digest: Digest,
}

impl Assertion {
    pub fn new(predicate: impl Into<Envelope>, object: impl Into<Envelope>) -> Self {
        let predicate = predicate.into();
        let object = object.into();
        let digest = DigestHasher::ASSERTION.hash_digests([predicate.digest(), object.digest()]);
        Self {
            predicate,
            object,
            digest,
        }
    }

    pub fn predicate(&self) -> &Envelope {
        &self.predicate
    }

    pub fn object(&self) -> &Envelope {
        &self.object
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }
}

/// Opaque ciphertext plus the digest of the plaintext it replaces.
///
/// Encryption itself happens elsewhere; an envelope only needs to carry the
/// result and keep the plaintext's digest so the tree's digests stay stable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; 12],
    pub digest: Digest,
}

impl EncryptedMessage {
    pub fn new(ciphertext: Vec<u8>, nonce: [u8; 12], digest: Digest) -> Self {
        Self {
            ciphertext,
            nonce,
            digest,
        }
    }
}

/// An immutable, content-addressed envelope.
#[derive(Clone)]
pub struct Envelope(Arc<EnvelopeCase>);

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Envelope {
    fn from_case(case: EnvelopeCase) -> Self {
        Self(Arc::new(case))
    }

    /// A leaf envelope holding `value`.
    pub fn new(value: impl Into<LeafValue>) -> Self {
        Self::from_leaf_value(value.into())
    }

    pub fn from_leaf_value(value: LeafValue) -> Self {
        let digest = DigestHasher::LEAF.hash(&value.canonical_bytes());
        Self::from_case(EnvelopeCase::Leaf { value, digest })
    }

    /// The `null` leaf.
    pub fn null() -> Self {
        Self::from_leaf_value(LeafValue::Null)
    }

    pub fn known_predicate(value: KnownPredicate) -> Self {
        let digest = DigestHasher::KNOWN_PREDICATE.hash(&value.value().to_be_bytes());
        Self::from_case(EnvelopeCase::KnownPredicate { value, digest })
    }

    /// A bare predicate/object assertion envelope.
    pub fn new_assertion(predicate: impl Into<Envelope>, object: impl Into<Envelope>) -> Self {
        Self::from_case(EnvelopeCase::Assertion(Assertion::new(predicate, object)))
    }

    /// A subject with the given assertions attached.
    ///
    /// Fails with [`EnvelopeError::InvalidFormat`] if any entry is not
    /// assertion-shaped.
    pub fn new_with_assertions(
        subject: impl Into<Envelope>,
        assertions: &[Envelope],
    ) -> EnvelopeResult<Self> {
        subject.into().add_assertions(assertions)
    }

    /// Wrap this envelope so enclosing structure treats it as one subject.
    pub fn wrap(&self) -> Self {
        let digest = DigestHasher::WRAPPED.hash_digests([self.digest()]);
        Self::from_case(EnvelopeCase::Wrapped {
            envelope: self.clone(),
            digest,
        })
    }

    /// A digest-only placeholder.
    pub fn new_elided(digest: Digest) -> Self {
        Self::from_case(EnvelopeCase::Elided(digest))
    }

    /// Replace this envelope with a placeholder carrying the same digest.
    pub fn elide(&self) -> Self {
        match self.case() {
            EnvelopeCase::Elided(_) => self.clone(),
            _ => Self::new_elided(*self.digest()),
        }
    }

    pub fn new_encrypted(message: EncryptedMessage) -> Self {
        Self::from_case(EnvelopeCase::Encrypted(message))
    }

    /// Build a node from parts, collapsing to the subject when there are no
    /// assertions. The subject must not be a node.
    pub(crate) fn from_parts(subject: Envelope, assertions: BTreeMap<Digest, Envelope>) -> Self {
        debug_assert!(!subject.is_node(), "node subject must not be a node");
        if assertions.is_empty() {
            return subject;
        }
        let digest =
            DigestHasher::NODE.hash_digests(iter::once(subject.digest()).chain(assertions.keys()));
        Self::from_case(EnvelopeCase::Node {
            subject,
            assertions,
            digest,
        })
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl Envelope {
    pub fn case(&self) -> &EnvelopeCase {
        &self.0
    }

    pub fn digest(&self) -> &Digest {
        match self.case() {
            EnvelopeCase::Node { digest, .. }
            | EnvelopeCase::Leaf { digest, .. }
            | EnvelopeCase::Wrapped { digest, .. }
            | EnvelopeCase::KnownPredicate { digest, .. }
            | EnvelopeCase::Elided(digest) => digest,
            EnvelopeCase::Assertion(assertion) => assertion.digest(),
            EnvelopeCase::Encrypted(message) => &message.digest,
        }
    }

    /// The subject of a node, or the envelope itself for every other case.
    pub fn subject(&self) -> Envelope {
        match self.case() {
            EnvelopeCase::Node { subject, .. } => subject.clone(),
            _ => self.clone(),
        }
    }

    /// The assertions of a node in digest order; empty for other cases.
    pub fn assertions(&self) -> Vec<Envelope> {
        self.assertion_map()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    /// The digest-keyed assertion set of a node.
    pub fn assertion_map(&self) -> Option<&BTreeMap<Digest, Envelope>> {
        match self.case() {
            EnvelopeCase::Node { assertions, .. } => Some(assertions),
            _ => None,
        }
    }

    pub fn assertion_count(&self) -> usize {
        self.assertion_map().map_or(0, BTreeMap::len)
    }

    pub fn has_assertions(&self) -> bool {
        self.assertion_count() > 0
    }

    /// The assertion, if this envelope is a bare assertion.
    pub fn as_assertion(&self) -> Option<&Assertion> {
        match self.case() {
            EnvelopeCase::Assertion(assertion) => Some(assertion),
            _ => None,
        }
    }

    /// The predicate of the subject, if the subject is an assertion.
    pub fn predicate(&self) -> Option<Envelope> {
        self.subject()
            .as_assertion()
            .map(|assertion| assertion.predicate().clone())
    }

    /// The object of the subject, if the subject is an assertion.
    pub fn object(&self) -> Option<Envelope> {
        self.subject()
            .as_assertion()
            .map(|assertion| assertion.object().clone())
    }

    /// The payload, if this envelope is a leaf.
    pub fn leaf_value(&self) -> Option<&LeafValue> {
        match self.case() {
            EnvelopeCase::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Extract a typed payload from a leaf subject.
    pub fn extract_subject<T: FromLeaf>(&self) -> EnvelopeResult<T> {
        let subject = self.subject();
        subject
            .leaf_value()
            .and_then(T::from_leaf)
            .ok_or(EnvelopeError::InvalidLeaf {
                expected: T::TYPE_NAME,
            })
    }

    /// The inner envelope of a wrapped subject.
    pub fn unwrap_envelope(&self) -> EnvelopeResult<Envelope> {
        match self.subject().case() {
            EnvelopeCase::Wrapped { envelope, .. } => Ok(envelope.clone()),
            _ => Err(EnvelopeError::NotWrapped),
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self.case(), EnvelopeCase::Node { .. })
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.case(), EnvelopeCase::Leaf { .. })
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self.case(), EnvelopeCase::Wrapped { .. })
    }

    pub fn is_known_predicate(&self) -> bool {
        matches!(self.case(), EnvelopeCase::KnownPredicate { .. })
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self.case(), EnvelopeCase::Assertion(_))
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self.case(), EnvelopeCase::Encrypted(_))
    }

    pub fn is_elided(&self) -> bool {
        matches!(self.case(), EnvelopeCase::Elided(_))
    }

    /// Encrypted or elided.
    pub fn is_obscured(&self) -> bool {
        self.is_encrypted() || self.is_elided()
    }

    pub fn is_subject_assertion(&self) -> bool {
        self.subject().is_assertion()
    }

    pub fn is_subject_obscured(&self) -> bool {
        self.subject().is_obscured()
    }

    /// Total number of envelopes in this tree, counting this one.
    pub fn elements_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(envelope) = pending.pop() {
            count += 1;
            pending.extend(envelope.children());
        }
        count
    }

    /// Maximum nesting depth; a childless envelope has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((envelope, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(envelope.children().into_iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Direct children, walked with an explicit stack so arbitrarily deep
    /// trees never exhaust the call stack.
    fn children(&self) -> Vec<&Envelope> {
        match self.case() {
            EnvelopeCase::Node {
                subject,
                assertions,
                ..
            } => iter::once(subject).chain(assertions.values()).collect(),
            EnvelopeCase::Assertion(assertion) => vec![assertion.predicate(), assertion.object()],
            EnvelopeCase::Wrapped { envelope, .. } => vec![envelope],
            EnvelopeCase::Leaf { .. }
            | EnvelopeCase::KnownPredicate { .. }
            | EnvelopeCase::Encrypted(_)
            | EnvelopeCase::Elided(_) => Vec::new(),
        }
    }

    /// Short label for the envelope's case.
    pub fn summary(&self) -> String {
        match self.case() {
            EnvelopeCase::Node { .. } => "NODE".to_string(),
            EnvelopeCase::Leaf { value, .. } => value.summary(),
            EnvelopeCase::Wrapped { .. } => "WRAPPED".to_string(),
            EnvelopeCase::KnownPredicate { value, .. } => value.name(),
            EnvelopeCase::Assertion(_) => "ASSERTION".to_string(),
            EnvelopeCase::Encrypted(_) => "ENCRYPTED".to_string(),
            EnvelopeCase::Elided(_) => "ELIDED".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Digest-based identity
// ---------------------------------------------------------------------------

impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.digest() == other.digest()
    }
}

impl Eq for Envelope {}

impl Hash for Envelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest().hash(state);
    }
}

impl PartialOrd for Envelope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Envelope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digest().cmp(other.digest())
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Envelope({} {})", self.summary(), self.digest().short_hex())
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<&Envelope> for Envelope {
    fn from(envelope: &Envelope) -> Self {
        envelope.clone()
    }
}

impl From<LeafValue> for Envelope {
    fn from(value: LeafValue) -> Self {
        Self::from_leaf_value(value)
    }
}

impl From<KnownPredicate> for Envelope {
    fn from(value: KnownPredicate) -> Self {
        Self::known_predicate(value)
    }
}

impl From<Assertion> for Envelope {
    fn from(assertion: Assertion) -> Self {
        Self::from_case(EnvelopeCase::Assertion(assertion))
    }
}

macro_rules! leaf_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Envelope {
                fn from(value: $ty) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

leaf_conversions!(&str, String, bool, i64, i32, u32, Vec<u8>, Digest);
