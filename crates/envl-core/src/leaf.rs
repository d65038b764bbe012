use std::fmt;

use envl_types::Digest;
use serde::{Deserialize, Serialize};

/// The payload of a leaf envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
    Digest(Digest),
}

impl LeafValue {
    /// Canonical byte encoding used for digesting.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Fixed-size ints and length-prefixed strings: bincode cannot fail here.
        bincode::serialize(self).expect("leaf values always encode")
    }

    /// Short human-readable rendering (used in summaries and logs).
    pub fn summary(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Text(s) => format!("{s:?}"),
            Self::Bytes(bytes) => format!("Bytes({})", bytes.len()),
            Self::Digest(digest) => format!("Digest({})", digest.short_hex()),
        }
    }

    /// Name of the payload type, as reported by extraction errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Digest(_) => "digest",
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl From<&str> for LeafValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for LeafValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for LeafValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for LeafValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for LeafValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<Vec<u8>> for LeafValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Digest> for LeafValue {
    fn from(digest: Digest) -> Self {
        Self::Digest(digest)
    }
}

/// Typed extraction of a leaf payload.
pub trait FromLeaf: Sized {
    /// Name reported when extraction fails.
    const TYPE_NAME: &'static str;

    fn from_leaf(value: &LeafValue) -> Option<Self>;
}

impl FromLeaf for String {
    const TYPE_NAME: &'static str = "text";

    fn from_leaf(value: &LeafValue) -> Option<Self> {
        match value {
            LeafValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromLeaf for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_leaf(value: &LeafValue) -> Option<Self> {
        match value {
            LeafValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromLeaf for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_leaf(value: &LeafValue) -> Option<Self> {
        match value {
            LeafValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromLeaf for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn from_leaf(value: &LeafValue) -> Option<Self> {
        match value {
            LeafValue::Bytes(bytes) => Some(bytes.clone()),
            _ => None,
        }
    }
}

impl FromLeaf for Digest {
    const TYPE_NAME: &'static str = "digest";

    fn from_leaf(value: &LeafValue) -> Option<Self> {
        match value {
            LeafValue::Digest(digest) => Some(*digest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_bytes_are_deterministic() {
        let a = LeafValue::from("alice");
        let b = LeafValue::Text("alice".into());
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn canonical_bytes_distinguish_types() {
        // The same digit as text and as an integer must not collide.
        assert_ne!(
            LeafValue::from("1").canonical_bytes(),
            LeafValue::from(1i64).canonical_bytes()
        );
        assert_ne!(
            LeafValue::Bytes(vec![]).canonical_bytes(),
            LeafValue::Text(String::new()).canonical_bytes()
        );
    }

    #[test]
    fn from_leaf_extracts_matching_type() {
        let digest = Digest::from_image(b"x");
        assert_eq!(Digest::from_leaf(&LeafValue::from(digest)), Some(digest));
        assert_eq!(String::from_leaf(&LeafValue::from("hi")), Some("hi".to_string()));
        assert_eq!(i64::from_leaf(&LeafValue::from(7)), Some(7));
        assert_eq!(bool::from_leaf(&LeafValue::from(true)), Some(true));
    }

    #[test]
    fn from_leaf_rejects_other_types() {
        assert_eq!(Digest::from_leaf(&LeafValue::from("not a digest")), None);
        assert_eq!(i64::from_leaf(&LeafValue::Null), None);
    }

    #[test]
    fn summary_quotes_text() {
        assert_eq!(LeafValue::from("bob").summary(), "\"bob\"");
        assert_eq!(LeafValue::Bytes(vec![1, 2, 3]).summary(), "Bytes(3)");
    }
}
