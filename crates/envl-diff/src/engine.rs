//! Diff computation: describe how to turn one envelope into another.
//!
//! [`DiffEngine::diff`] is total. Pairings it cannot express as an edit fall
//! back to replacing the source with the target.
//!
//! Depth is counted the way [`PatchEngine`](crate::PatchEngine) counts it:
//! a sub-diff computed at depth `d` is applied at depth `d`. Once the limit
//! is reached the engine emits a [`wholesale`] diff, which the patch engine
//! applies without descending further.

use envl_core::{Envelope, EnvelopeCase};
use tracing::{debug, warn};

use crate::config::DiffConfig;
use crate::vocab::{self, SubEntryLabel};

/// Computes diff envelopes.
#[derive(Clone, Debug, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

impl DiffEngine {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with the given depth limit.
    pub fn with_config(config: DiffConfig) -> Self {
        Self { config }
    }

    /// The configuration this engine diffs under.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compute the diff that transforms `source` into `target`.
    pub fn diff(&self, source: &Envelope, target: &Envelope) -> Envelope {
        let diff = self.diff_at(source, target, 0);
        debug!(
            source = %source.digest().short_hex(),
            target = %target.digest().short_hex(),
            elements = diff.elements_count(),
            "computed diff"
        );
        diff
    }

    pub(crate) fn diff_at(&self, source: &Envelope, target: &Envelope, depth: usize) -> Envelope {
        if source == target {
            return vocab::no_change();
        }
        if self.at_limit(depth) {
            warn!(depth, "diff depth limit reached; replacing subtree wholesale");
            return wholesale(source, target);
        }

        match (source.case(), target.case()) {
            // Any source against a node: diff the assertion sets (a non-node
            // source contributes an empty set) and the subjects.
            (_, EnvelopeCase::Node { .. }) | (EnvelopeCase::Node { .. }, _) => {
                self.diff_assertion_sets(source, target, depth)
            }
            (EnvelopeCase::Assertion(source_pair), EnvelopeCase::Assertion(target_pair)) => {
                let mut edit = vocab::edit_tag(source.digest());
                let predicate =
                    self.diff_at(source_pair.predicate(), target_pair.predicate(), depth + 1);
                if !vocab::is_no_change(&predicate) {
                    edit = vocab::with_sub_entry(&edit, SubEntryLabel::Predicate, predicate);
                }
                let object = self.diff_at(source_pair.object(), target_pair.object(), depth + 1);
                if !vocab::is_no_change(&object) {
                    edit = vocab::with_sub_entry(&edit, SubEntryLabel::Object, object);
                }
                edit
            }
            (EnvelopeCase::Assertion(_), _) => replace_assertion(source, target),
            (
                EnvelopeCase::Wrapped {
                    envelope: source_inner,
                    ..
                },
                EnvelopeCase::Wrapped {
                    envelope: target_inner,
                    ..
                },
            ) => self.diff_at(source_inner, target_inner, depth + 1).wrap(),
            _ => target.clone(),
        }
    }

    pub(crate) fn at_limit(&self, depth: usize) -> bool {
        depth >= self.config.max_depth
    }

    /// Whether `diff_at(source, target, depth)` is edit-tagged with the
    /// digest of `source` itself. `source` and `target` differ.
    pub(crate) fn edits_in_place(
        &self,
        source: &Envelope,
        target: &Envelope,
        depth: usize,
    ) -> bool {
        let subject_changes = target.subject() != *source;
        if self.at_limit(depth) {
            !source.is_node() && subject_changes
        } else {
            source.is_assertion() && subject_changes
        }
    }
}

/// Edit the whole assertion `source` into `target` through an `assertion`
/// sub-entry.
pub(crate) fn replace_assertion(source: &Envelope, target: &Envelope) -> Envelope {
    vocab::with_sub_entry(
        &vocab::edit_tag(source.digest()),
        SubEntryLabel::Assertion,
        target.clone(),
    )
}

/// The diff that replaces `source` by `target` without looking inside
/// either: a changed subject is replaced verbatim, every source-only
/// assertion is deleted, and every target-only one added.
///
/// This is the engine's fallback at the depth limit and the baseline a
/// matched diff is measured against. It never recurses.
pub fn wholesale(source: &Envelope, target: &Envelope) -> Envelope {
    if source == target {
        return vocab::no_change();
    }
    if !source.is_node() && !target.is_node() {
        return vocab::replacement(source, target);
    }
    let (source_subject, target_subject) = (source.subject(), target.subject());
    let subject = if source_subject == target_subject {
        vocab::no_change()
    } else {
        vocab::replacement(&source_subject, &target_subject)
    };
    let source_assertions = source.assertions();
    let target_assertions = target.assertions();
    let deletes = source_assertions
        .iter()
        .filter(|assertion| !target_assertions.contains(assertion))
        .map(|assertion| vocab::delete_entry(assertion.digest()));
    let adds = target_assertions
        .iter()
        .filter(|assertion| !source_assertions.contains(assertion))
        .map(vocab::add_entry);
    let entries: Vec<Envelope> = deletes.chain(adds).collect();
    vocab::attach_entries(&subject, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use envl_core::EncryptedMessage;
    use envl_types::KnownPredicate;

    fn engine() -> DiffEngine {
        DiffEngine::new()
    }

    #[test]
    fn identical_envelopes_produce_no_change() {
        let envelope = Envelope::new("alice").add_assertion_pair("knows", "bob");
        assert!(vocab::is_no_change(&engine().diff(&envelope, &envelope)));
    }

    #[test]
    fn elided_target_with_same_digest_is_no_change() {
        let envelope = Envelope::new_assertion("knows", "bob");
        assert!(vocab::is_no_change(&engine().diff(&envelope, &envelope.elide())));
    }

    #[test]
    fn leaf_to_leaf_is_bare_replacement() {
        let diff = engine().diff(&Envelope::new("alice"), &Envelope::new("bob"));
        assert_eq!(diff, Envelope::new("bob"));
        assert!(!diff.has_assertions());
    }

    #[test]
    fn assertion_object_change_edits_only_object() {
        let source = Envelope::new_assertion("A", "B");
        let target = Envelope::new_assertion("A", "C");
        let diff = engine().diff(&source, &target);

        assert_eq!(vocab::edit_reference(&diff), Some(*source.digest()));
        assert_eq!(diff.assertion_count(), 1);
        assert_eq!(
            vocab::sub_entry(&diff, SubEntryLabel::Object).unwrap(),
            Some(Envelope::new("C"))
        );
        assert_eq!(vocab::sub_entry(&diff, SubEntryLabel::Predicate).unwrap(), None);
    }

    #[test]
    fn assertion_predicate_and_object_change() {
        let source = Envelope::new_assertion("A", "B");
        let target = Envelope::new_assertion("X", "Y");
        let diff = engine().diff(&source, &target);
        assert_eq!(diff.assertion_count(), 2);
        assert_eq!(
            vocab::sub_entry(&diff, SubEntryLabel::Predicate).unwrap(),
            Some(Envelope::new("X"))
        );
    }

    #[test]
    fn assertion_to_elided_replaces_whole_assertion() {
        let source = Envelope::new_assertion("A", "B");
        let target = Envelope::new_assertion("A", "C").elide();
        let diff = engine().diff(&source, &target);
        assert_eq!(vocab::edit_reference(&diff), Some(*source.digest()));
        let replacement = vocab::sub_entry(&diff, SubEntryLabel::Assertion)
            .unwrap()
            .unwrap();
        assert!(replacement.is_elided());
        assert_eq!(replacement, target);
    }

    #[test]
    fn assertion_to_encrypted_replaces_whole_assertion() {
        let source = Envelope::new_assertion("A", "B");
        let hidden = Envelope::new_assertion("A", "C");
        let target = Envelope::new_encrypted(EncryptedMessage::new(
            vec![9; 16],
            [1; 12],
            *hidden.digest(),
        ));
        let diff = engine().diff(&source, &target);
        let replacement = vocab::sub_entry(&diff, SubEntryLabel::Assertion)
            .unwrap()
            .unwrap();
        assert!(replacement.is_encrypted());
    }

    #[test]
    fn assertion_to_leaf_is_assertion_replacement() {
        let source = Envelope::new_assertion("A", "B");
        let target = Envelope::new("plain");
        let diff = engine().diff(&source, &target);
        assert_eq!(vocab::edit_reference(&diff), Some(*source.digest()));
        assert_eq!(
            vocab::sub_entry(&diff, SubEntryLabel::Assertion).unwrap(),
            Some(target)
        );
    }

    #[test]
    fn wrapped_to_wrapped_recurses_and_rewraps() {
        let source = Envelope::new("alice").wrap();
        let target = Envelope::new("bob").wrap();
        let diff = engine().diff(&source, &target);
        assert!(diff.is_wrapped());
        assert_eq!(diff.unwrap_envelope().unwrap(), Envelope::new("bob"));
    }

    #[test]
    fn wrapped_to_node_adds_every_assertion() {
        let source = Envelope::new("alice").wrap();
        let target = Envelope::new("alice")
            .add_assertion_pair("knows", "bob")
            .add_assertion_pair("knows", "carol");
        let diff = engine().diff(&source, &target);
        assert_eq!(diff.subject(), Envelope::new("alice"));
        assert_eq!(diff.assertion_count(), 2);
        assert!(diff
            .assertions()
            .iter()
            .all(|entry| entry.predicate() == Some(Envelope::new(vocab::ADD))));
    }

    #[test]
    fn mismatched_cases_fall_back_to_target() {
        let known = Envelope::known_predicate(KnownPredicate::NOTE);
        let leaf = Envelope::new("note");
        assert_eq!(engine().diff(&known, &leaf), leaf);
        let elided = Envelope::new("secret").elide();
        assert_eq!(engine().diff(&elided, &known), known);
        let wrapped = Envelope::new("x").wrap();
        assert_eq!(engine().diff(&leaf, &wrapped), wrapped);
    }

    #[test]
    fn node_to_leaf_deletes_assertions() {
        let source = Envelope::new("alice").add_assertion_pair("knows", "bob");
        let diff = engine().diff(&source, &Envelope::new("alice"));
        assert!(vocab::is_no_change(&diff.subject()));
        assert_eq!(diff.assertion_count(), 1);
        assert_eq!(
            diff.assertions()[0].predicate(),
            Some(Envelope::new(vocab::DELETE))
        );
    }

    #[test]
    fn depth_limit_falls_back_to_wholesale() {
        let source = Envelope::new_assertion("A", Envelope::new_assertion("B", "C"));
        let target = Envelope::new_assertion("A", Envelope::new_assertion("B", "D"));
        let shallow = DiffEngine::with_config(DiffConfig::with_max_depth(0));
        let diff = shallow.diff(&source, &target);
        assert_eq!(diff, wholesale(&source, &target));
        assert_eq!(
            vocab::sub_entry(&diff, SubEntryLabel::Replacement).unwrap(),
            Some(target.clone())
        );

        // one level of room: the object is edited, its inner assertion replaced
        let one = DiffEngine::with_config(DiffConfig::with_max_depth(1));
        let object = vocab::sub_entry(&one.diff(&source, &target), SubEntryLabel::Object)
            .unwrap()
            .unwrap();
        assert_eq!(
            vocab::sub_entry(&object, SubEntryLabel::Replacement).unwrap(),
            Some(Envelope::new_assertion("B", "D"))
        );
    }

    #[test]
    fn wholesale_never_looks_inside_wrappers() {
        let nest = |leaf: &str| (0..20_000).fold(Envelope::new(leaf), |e, _| e.wrap());
        let (source, target) = (nest("a"), nest("b"));
        let diff = wholesale(&source, &target);
        assert_eq!(vocab::edit_reference(&diff), Some(*source.digest()));
        assert_eq!(vocab::sub_entry(&diff, SubEntryLabel::Replacement).unwrap(), Some(target));
    }

    #[test]
    fn in_place_prediction_matches_diff_shape() {
        let plain = Envelope::new_assertion("knows", "bob");
        let annotated = plain.add_assertion_pair("note", "x");
        let pairs = [
            (plain.clone(), Envelope::new_assertion("knows", "carol")),
            (plain.clone(), annotated.clone()),
            (annotated.clone(), plain.clone()),
            (plain.clone(), Envelope::new_assertion("knows", "eve").add_assertion_pair("n", 1)),
            (plain.elide(), Envelope::new_assertion("knows", "carol")),
            (plain.clone(), Envelope::new("leaf")),
        ];
        for max_depth in [0, 1, 8] {
            let engine = DiffEngine::with_config(DiffConfig::with_max_depth(max_depth));
            for (source, target) in &pairs {
                for depth in 0..=max_depth {
                    let diff = engine.diff_at(source, target, depth);
                    assert_eq!(
                        engine.edits_in_place(source, target, depth),
                        vocab::edit_reference(&diff) == Some(*source.digest()),
                        "{source:?} -> {target:?} at {depth}/{max_depth}"
                    );
                }
            }
        }
    }

    #[test]
    fn wholesale_node_diff_lists_every_change() {
        let source = Envelope::new("alice")
            .add_assertion_pair("knows", "bob")
            .add_assertion_pair("age", 30);
        let target = Envelope::new("alice")
            .add_assertion_pair("knows", "bob")
            .add_assertion_pair("age", 31);
        let diff = wholesale(&source, &target);
        assert!(vocab::is_no_change(&diff.subject()));
        // one delete, one add; the shared assertion is left alone
        assert_eq!(diff.assertion_count(), 2);
    }
}
