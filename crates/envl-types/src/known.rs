use std::fmt;

use serde::{Deserialize, Serialize};

/// Registry of well-known predicate values and their names.
const REGISTRY: &[(u64, &str)] = &[
    (1, "id"),
    (2, "isA"),
    (3, "verifiedBy"),
    (4, "note"),
    (5, "hasRecipient"),
    (6, "sskrShare"),
    (7, "controller"),
    (8, "publicKey"),
    (9, "dereferenceVia"),
    (10, "entity"),
    (11, "hasName"),
    (12, "language"),
    (13, "issuer"),
    (14, "holder"),
    (15, "salt"),
    (16, "date"),
];

/// A compact numeric identifier standing in for a predicate.
///
/// Predicates that appear in many documents are encoded as a small integer
/// instead of a full leaf. Values outside the registry are allowed and
/// display as their decimal value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KnownPredicate(u64);

impl KnownPredicate {
    pub const ID: Self = Self(1);
    pub const IS_A: Self = Self(2);
    pub const VERIFIED_BY: Self = Self(3);
    pub const NOTE: Self = Self(4);
    pub const HAS_RECIPIENT: Self = Self(5);
    pub const SSKR_SHARE: Self = Self(6);
    pub const CONTROLLER: Self = Self(7);
    pub const PUBLIC_KEY: Self = Self(8);
    pub const DEREFERENCE_VIA: Self = Self(9);
    pub const ENTITY: Self = Self(10);
    pub const HAS_NAME: Self = Self(11);
    pub const LANGUAGE: Self = Self(12);
    pub const ISSUER: Self = Self(13);
    pub const HOLDER: Self = Self(14);
    pub const SALT: Self = Self(15);
    pub const DATE: Self = Self(16);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The registered name, if this value is in the registry.
    pub fn registered_name(&self) -> Option<&'static str> {
        REGISTRY
            .iter()
            .find(|(value, _)| *value == self.0)
            .map(|(_, name)| *name)
    }

    /// The registered name, or the decimal value for unregistered predicates.
    pub fn name(&self) -> String {
        match self.registered_name() {
            Some(name) => name.to_string(),
            None => self.0.to_string(),
        }
    }

    /// Look up a registered predicate by name.
    pub fn from_name(name: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(_, registered)| *registered == name)
            .map(|(value, _)| Self(*value))
    }
}

impl fmt::Debug for KnownPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KnownPredicate({})", self.name())
    }
}

impl fmt::Display for KnownPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl From<u64> for KnownPredicate {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
