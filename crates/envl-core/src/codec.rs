//! JSON interchange for envelopes.
//!
//! Envelopes serialize through [`EnvelopeRepr`], a tagged mirror of
//! [`EnvelopeCase`] without derived digests. Decoding rebuilds every derived
//! digest from content, so a tampered payload yields a different digest
//! rather than a forged one. Elided and encrypted envelopes keep the digest
//! they carry.

use envl_types::{Digest, KnownPredicate};
use serde::{Deserialize, Serialize};

use crate::envelope::{EncryptedMessage, Envelope, EnvelopeCase};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::leaf::LeafValue;

/// Serialized form of an envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "case", rename_all = "snake_case")]
pub enum EnvelopeRepr {
    Node {
        subject: Envelope,
        assertions: Vec<Envelope>,
    },
    Leaf {
        value: LeafValue,
    },
    Wrapped {
        envelope: Envelope,
    },
    KnownPredicate {
        value: KnownPredicate,
    },
    Assertion {
        predicate: Envelope,
        object: Envelope,
    },
    Encrypted {
        message: EncryptedMessage,
    },
    Elided {
        digest: Digest,
    },
}

impl From<Envelope> for EnvelopeRepr {
    fn from(envelope: Envelope) -> Self {
        match envelope.case() {
            EnvelopeCase::Node {
                subject,
                assertions,
                ..
            } => Self::Node {
                subject: subject.clone(),
                assertions: assertions.values().cloned().collect(),
            },
            EnvelopeCase::Leaf { value, .. } => Self::Leaf {
                value: value.clone(),
            },
            EnvelopeCase::Wrapped { envelope, .. } => Self::Wrapped {
                envelope: envelope.clone(),
            },
            EnvelopeCase::KnownPredicate { value, .. } => Self::KnownPredicate { value: *value },
            EnvelopeCase::Assertion(assertion) => Self::Assertion {
                predicate: assertion.predicate().clone(),
                object: assertion.object().clone(),
            },
            EnvelopeCase::Encrypted(message) => Self::Encrypted {
                message: message.clone(),
            },
            EnvelopeCase::Elided(digest) => Self::Elided { digest: *digest },
        }
    }
}

impl TryFrom<EnvelopeRepr> for Envelope {
    type Error = EnvelopeError;

    fn try_from(repr: EnvelopeRepr) -> EnvelopeResult<Self> {
        match repr {
            EnvelopeRepr::Node {
                subject,
                assertions,
            } => {
                if subject.is_node() {
                    return Err(EnvelopeError::InvalidFormat(
                        "node subject must not be a node".into(),
                    ));
                }
                if assertions.is_empty() {
                    return Err(EnvelopeError::InvalidFormat(
                        "node must carry at least one assertion".into(),
                    ));
                }
                subject.add_assertions(&assertions)
            }
            EnvelopeRepr::Leaf { value } => Ok(Envelope::from_leaf_value(value)),
            EnvelopeRepr::Wrapped { envelope } => Ok(envelope.wrap()),
            EnvelopeRepr::KnownPredicate { value } => Ok(Envelope::known_predicate(value)),
            EnvelopeRepr::Assertion { predicate, object } => {
                Ok(Envelope::new_assertion(predicate, object))
            }
            EnvelopeRepr::Encrypted { message } => Ok(Envelope::new_encrypted(message)),
            EnvelopeRepr::Elided { digest } => Ok(Envelope::new_elided(digest)),
        }
    }
}

impl Serialize for Envelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnvelopeRepr::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = EnvelopeRepr::deserialize(deserializer)?;
        Envelope::try_from(repr).map_err(serde::de::Error::custom)
    }
}

impl Envelope {
    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> EnvelopeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EnvelopeError::Serialization(e.to_string()))
    }

    /// Decode from JSON, recomputing derived digests.
    pub fn from_json(json: &str) -> EnvelopeResult<Self> {
        serde_json::from_str(json).map_err(|e| EnvelopeError::Serialization(e.to_string()))
    }
}
