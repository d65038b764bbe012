use envl_types::Digest;

/// Domain-separated BLAKE3 digest hasher.
///
/// Each hasher carries a domain tag (e.g., `"envl-leaf-v1"`) that is
/// prepended to every hash computation. A leaf and an assertion built over
/// identical bytes therefore produce different digests.
pub struct DigestHasher {
    domain: &'static str,
}

impl DigestHasher {
    /// Hasher for leaf payloads.
    pub const LEAF: Self = Self {
        domain: "envl-leaf-v1",
    };
    /// Hasher for subject + assertion-set nodes.
    pub const NODE: Self = Self {
        domain: "envl-node-v1",
    };
    /// Hasher for wrapped envelopes.
    pub const WRAPPED: Self = Self {
        domain: "envl-wrapped-v1",
    };
    /// Hasher for predicate/object assertions.
    pub const ASSERTION: Self = Self {
        domain: "envl-assertion-v1",
    };
    /// Hasher for known predicates.
    pub const KNOWN_PREDICATE: Self = Self {
        domain: "envl-known-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = self.start();
        hasher.update(data);
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash an ordered sequence of child digests with domain separation.
    ///
    /// Callers are responsible for ordering: a node passes its subject first,
    /// then its assertions in digest order.
    pub fn hash_digests<'a, I>(&self, digests: I) -> Digest
    where
        I: IntoIterator<Item = &'a Digest>,
    {
        let mut hasher = self.start();
        for digest in digests {
            hasher.update(digest.as_bytes());
        }
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &Digest) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }

    fn start(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(DigestHasher::LEAF.hash(data), DigestHasher::LEAF.hash(data));
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let leaf = DigestHasher::LEAF.hash(data);
        let node = DigestHasher::NODE.hash(data);
        let wrapped = DigestHasher::WRAPPED.hash(data);
        assert_ne!(leaf, node);
        assert_ne!(leaf, wrapped);
        assert_ne!(node, wrapped);
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let id = DigestHasher::LEAF.hash(b"original");
        assert!(DigestHasher::LEAF.verify(b"original", &id));
        assert!(!DigestHasher::LEAF.verify(b"tampered", &id));
    }

    #[test]
    fn hash_digests_is_order_sensitive() {
        let a = Digest::from_image(b"a");
        let b = Digest::from_image(b"b");
        let ab = DigestHasher::ASSERTION.hash_digests([&a, &b]);
        let ba = DigestHasher::ASSERTION.hash_digests([&b, &a]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn hash_digests_matches_concatenated_bytes() {
        let a = Digest::from_image(b"a");
        let b = Digest::from_image(b"b");
        let mut bytes = a.as_bytes().to_vec();
        bytes.extend_from_slice(b.as_bytes());
        assert_eq!(
            DigestHasher::NODE.hash_digests([&a, &b]),
            DigestHasher::NODE.hash(&bytes)
        );
    }

    #[test]
    fn custom_domain() {
        let hasher = DigestHasher::new("my-custom-domain-v1");
        assert_eq!(hasher.domain(), "my-custom-domain-v1");
        assert_ne!(hasher.hash(b"data"), DigestHasher::LEAF.hash(b"data"));
    }
}
