//! Value-producing edits and lookups over an envelope's assertion set.
//!
//! None of these mutate: every edit returns a new envelope that shares all
//! untouched subtrees with the original.

use std::collections::BTreeMap;

use envl_types::Digest;

use crate::envelope::Envelope;
use crate::error::{EnvelopeError, EnvelopeResult};

impl Envelope {
    /// Attach an assertion.
    ///
    /// The argument must be assertion-shaped: its subject is an assertion or
    /// an obscured (encrypted/elided) stand-in for one. Adding an assertion
    /// whose digest is already present returns the envelope unchanged.
    pub fn add_assertion(&self, assertion: &Envelope) -> EnvelopeResult<Envelope> {
        check_assertion_shaped(assertion)?;
        Ok(self.attach([assertion.clone()]))
    }

    /// Attach a new `predicate: object` assertion.
    pub fn add_assertion_pair(
        &self,
        predicate: impl Into<Envelope>,
        object: impl Into<Envelope>,
    ) -> Envelope {
        self.attach([Envelope::new_assertion(predicate, object)])
    }

    /// Attach several assertions; fails without attaching any if one of them
    /// is not assertion-shaped.
    pub fn add_assertions(&self, assertions: &[Envelope]) -> EnvelopeResult<Envelope> {
        for assertion in assertions {
            check_assertion_shaped(assertion)?;
        }
        Ok(self.attach(assertions.iter().cloned()))
    }

    /// Remove the assertion with the given digest.
    ///
    /// Removing an absent digest returns the envelope unchanged. Removing the
    /// last assertion collapses the node to its subject.
    pub fn remove_assertion(&self, digest: &Digest) -> Envelope {
        match self.assertion_map() {
            Some(map) if map.contains_key(digest) => {
                let mut remaining = map.clone();
                remaining.remove(digest);
                Envelope::from_parts(self.subject(), remaining)
            }
            _ => self.clone(),
        }
    }

    /// Replace the assertion with digest `old` by `new`.
    ///
    /// If `new` collides with an assertion already present, set semantics
    /// keep a single copy.
    pub fn replace_assertion(&self, old: &Digest, new: &Envelope) -> EnvelopeResult<Envelope> {
        check_assertion_shaped(new)?;
        Ok(self.remove_assertion(old).attach([new.clone()]))
    }

    /// Replace the subject, keeping the current assertions.
    ///
    /// If the new subject is itself a node, the two assertion sets merge.
    pub fn replace_subject(&self, subject: &Envelope) -> Envelope {
        subject.attach(self.assertions())
    }

    /// The assertion with the given digest.
    pub fn assertion_with_digest(&self, digest: &Digest) -> EnvelopeResult<Envelope> {
        self.assertion_map()
            .and_then(|map| map.get(digest))
            .cloned()
            .ok_or(EnvelopeError::NonexistentAssertion(*digest))
    }

    /// All assertions whose predicate equals `predicate`.
    pub fn assertions_with_predicate(&self, predicate: impl Into<Envelope>) -> Vec<Envelope> {
        let predicate = predicate.into();
        self.assertion_map()
            .map(|map| {
                map.values()
                    .filter(|assertion| assertion.predicate().as_ref() == Some(&predicate))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The single assertion whose predicate equals `predicate`.
    pub fn assertion_with_predicate(&self, predicate: impl Into<Envelope>) -> EnvelopeResult<Envelope> {
        let mut matches = self.assertions_with_predicate(predicate).into_iter();
        match (matches.next(), matches.next()) {
            (None, _) => Err(EnvelopeError::NonexistentPredicate),
            (Some(assertion), None) => Ok(assertion),
            (Some(_), Some(_)) => Err(EnvelopeError::AmbiguousPredicate),
        }
    }

    /// The object of the single assertion whose predicate equals `predicate`.
    pub fn object_for_predicate(&self, predicate: impl Into<Envelope>) -> EnvelopeResult<Envelope> {
        self.assertion_with_predicate(predicate)?
            .object()
            .ok_or_else(|| EnvelopeError::InvalidFormat("assertion subject is obscured".into()))
    }

    /// Merge already-validated assertions into this envelope's set.
    fn attach(&self, assertions: impl IntoIterator<Item = Envelope>) -> Envelope {
        let mut map: BTreeMap<Digest, Envelope> = self.assertion_map().cloned().unwrap_or_default();
        let before = map.len();
        for assertion in assertions {
            map.entry(*assertion.digest()).or_insert(assertion);
        }
        if map.len() == before {
            return self.clone();
        }
        Envelope::from_parts(self.subject(), map)
    }
}

fn check_assertion_shaped(envelope: &Envelope) -> EnvelopeResult<()> {
    if envelope.is_subject_assertion() || envelope.is_subject_obscured() {
        Ok(())
    } else {
        Err(EnvelopeError::InvalidFormat(format!(
            "{} is not an assertion",
            envelope.summary()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Envelope {
        Envelope::new("alice")
            .add_assertion_pair("knows", "bob")
            .add_assertion_pair("knows", "carol")
            .add_assertion_pair("age", 30)
    }

    #[test]
    fn add_assertion_creates_node() {
        let node = Envelope::new("alice").add_assertion_pair("knows", "bob");
        assert!(node.is_node());
        assert_eq!(node.subject(), Envelope::new("alice"));
        assert_eq!(node.assertion_count(), 1);
    }

    #[test]
    fn add_assertion_rejects_non_assertions() {
        let err = Envelope::new("alice")
            .add_assertion(&Envelope::new("bob"))
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidFormat(_)));
    }

    #[test]
    fn add_assertion_accepts_obscured_and_annotated_assertions() {
        let assertion = Envelope::new_assertion("knows", "bob");
        let annotated = assertion.add_assertion_pair("note", "since 2020");
        let node = Envelope::new("alice")
            .add_assertion(&assertion.elide())
            .unwrap()
            .add_assertion(&annotated)
            .unwrap();
        assert_eq!(node.assertion_count(), 2);
    }

    #[test]
    fn duplicate_assertion_is_collapsed() {
        let once = Envelope::new("alice").add_assertion_pair("knows", "bob");
        let twice = once.add_assertion_pair("knows", "bob");
        assert_eq!(once, twice);
        assert_eq!(twice.assertion_count(), 1);
    }

    #[test]
    fn add_assertions_is_all_or_nothing() {
        let good = Envelope::new_assertion("knows", "bob");
        let bad = Envelope::new("oops");
        assert!(Envelope::new("alice").add_assertions(&[good, bad]).is_err());
    }

    #[test]
    fn remove_assertion_and_collapse() {
        let node = Envelope::new("alice").add_assertion_pair("knows", "bob");
        let assertion = Envelope::new_assertion("knows", "bob");
        let removed = node.remove_assertion(assertion.digest());
        assert!(removed.is_leaf());
        assert_eq!(removed, Envelope::new("alice"));
    }

    #[test]
    fn remove_absent_assertion_is_noop() {
        let node = alice();
        let absent = Envelope::new_assertion("knows", "dave");
        assert_eq!(node.remove_assertion(absent.digest()), node);
    }

    #[test]
    fn replace_assertion_swaps_entry() {
        let old = Envelope::new_assertion("age", 30);
        let new = Envelope::new_assertion("age", 31);
        let updated = alice().replace_assertion(old.digest(), &new).unwrap();
        assert_eq!(updated.assertion_count(), 3);
        assert!(updated.assertion_with_digest(new.digest()).is_ok());
        assert!(updated.assertion_with_digest(old.digest()).is_err());
    }

    #[test]
    fn replace_subject_keeps_assertions() {
        let node = alice();
        let renamed = node.replace_subject(&Envelope::new("alicia"));
        assert_eq!(renamed.subject(), Envelope::new("alicia"));
        assert_eq!(renamed.assertions(), node.assertions());
    }

    #[test]
    fn replace_subject_with_node_merges() {
        let node = Envelope::new("alice").add_assertion_pair("knows", "bob");
        let other = Envelope::new("alicia").add_assertion_pair("age", 30);
        let merged = node.replace_subject(&other);
        assert_eq!(merged.subject(), Envelope::new("alicia"));
        assert_eq!(merged.assertion_count(), 2);
    }

    #[test]
    fn replace_subject_on_leaf_returns_new_subject() {
        let replaced = Envelope::new("alice").replace_subject(&Envelope::new("bob"));
        assert_eq!(replaced, Envelope::new("bob"));
    }

    #[test]
    fn lookup_by_predicate() {
        let node = alice();
        assert_eq!(node.assertions_with_predicate("knows").len(), 2);
        assert_eq!(node.object_for_predicate("age").unwrap(), Envelope::new(30));
        assert_eq!(
            node.assertion_with_predicate("knows").unwrap_err(),
            EnvelopeError::AmbiguousPredicate
        );
        assert_eq!(
            node.assertion_with_predicate("height").unwrap_err(),
            EnvelopeError::NonexistentPredicate
        );
    }

    #[test]
    fn lookup_by_digest() {
        let node = alice();
        let assertion = Envelope::new_assertion("knows", "carol");
        assert_eq!(node.assertion_with_digest(assertion.digest()).unwrap(), assertion);
        let missing = Envelope::new_assertion("knows", "eve");
        assert_eq!(
            node.assertion_with_digest(missing.digest()).unwrap_err(),
            EnvelopeError::NonexistentAssertion(*missing.digest())
        );
    }

    #[test]
    fn edits_do_not_touch_the_original() {
        let node = alice();
        let digest = *node.digest();
        let _ = node.add_assertion_pair("likes", "tea");
        let _ = node.remove_assertion(Envelope::new_assertion("age", 30).digest());
        assert_eq!(*node.digest(), digest);
        assert_eq!(node.assertion_count(), 3);
    }
}
