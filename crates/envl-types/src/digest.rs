use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of bytes in a [`Digest`].
pub const DIGEST_LEN: usize = 32;

/// The 32-byte BLAKE3 digest that identifies an envelope.
///
/// Every envelope case commits to one: leaves to their encoded value, nodes
/// to their subject and the sorted digests of their assertions, wrappers to
/// the digest they wrap. Elided and encrypted envelopes store the digest of
/// what they hide, so obscuring part of a tree leaves every digest above it
/// unchanged. Diffs refer to assertions by digest, which makes the byte
/// order below the order in which assertion sets are walked.
///
/// Domain-separated hashing lives in `envl-crypto`; this type only holds
/// and prints the result.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Hash `image` directly, without a domain tag. Mostly useful in tests.
    pub fn from_image(image: &[u8]) -> Self {
        Self(*blake3::hash(image).as_bytes())
    }

    pub const fn from_hash(hash: [u8; DIGEST_LEN]) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// All 64 hex digits.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first four bytes in hex; enough to tell envelopes apart in logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse the 64-digit form written by [`Digest::to_hex`].
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<&[u8]> for Digest {
    type Error = TypeError;

    fn try_from(bytes: &[u8]) -> Result<Self, TypeError> {
        <[u8; DIGEST_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| TypeError::InvalidLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            })
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, TypeError> {
        Self::from_hex(s)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

// Debug stays short so envelope dumps remain readable.
impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Digest").field(&format_args!("{}", self.short_hex())).finish()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn same_image_same_digest() {
        assert_eq!(Digest::from_image(b"alice"), Digest::from_image(b"alice"));
        assert_ne!(Digest::from_image(b"alice"), Digest::from_image(b"bob"));
    }

    #[test]
    fn parses_its_own_hex() {
        let digest = Digest::from_image(b"envelope");
        assert_eq!(digest.to_hex().len(), 64);
        assert_eq!(digest.to_hex().parse::<Digest>().unwrap(), digest);
        assert_eq!(digest.to_string(), digest.to_hex());
    }

    #[test]
    fn rejects_short_and_non_hex_input() {
        assert_eq!(
            Digest::from_hex("abcd").unwrap_err(),
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
        assert!(matches!(
            Digest::from_hex("not hex at all"),
            Err(TypeError::InvalidHex(_))
        ));
        assert!(Digest::try_from(&[0u8; 31][..]).is_err());
    }

    #[test]
    fn debug_shows_short_prefix() {
        let digest = Digest::from_hash([0xab; 32]);
        assert_eq!(digest.short_hex(), "abababab");
        assert_eq!(format!("{digest:?}"), "Digest(abababab)");
    }

    #[test]
    fn serde_roundtrip() {
        let digest = Digest::from_image(b"serde test");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(serde_json::from_str::<Digest>(&json).unwrap(), digest);
    }

    proptest! {
        #[test]
        fn ordering_matches_byte_order(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            prop_assert_eq!(Digest::from_hash(a).cmp(&Digest::from_hash(b)), a.cmp(&b));
        }
    }
}
