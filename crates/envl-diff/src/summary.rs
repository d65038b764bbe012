//! Counting the entries of a diff envelope.

use envl_core::Envelope;
use serde::Serialize;

use crate::error::PatchResult;
use crate::vocab::{self, DiffTag, EntryKind};

/// Shape of a diff: whether it touches the subject and how many entries of
/// each kind it carries at the top level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// The diff subject is something other than `noChange`.
    pub subject_changed: bool,
    pub additions: usize,
    pub deletions: usize,
    pub edits: usize,
}

impl DiffSummary {
    /// Summarize a diff envelope, rejecting entries with unknown tags.
    pub fn of(diff: &Envelope) -> PatchResult<Self> {
        let mut summary = Self {
            subject_changed: !vocab::is_no_change(&diff.subject()),
            ..Self::default()
        };
        for entry in diff.assertions() {
            match vocab::classify(&entry)? {
                EntryKind::Tagged(DiffTag::Add) => summary.additions += 1,
                EntryKind::Tagged(DiffTag::Delete) => summary.deletions += 1,
                EntryKind::Tagged(DiffTag::Edit) => summary.edits += 1,
                EntryKind::SubEntry(_) => {}
            }
        }
        Ok(summary)
    }

    /// Returns `true` if the diff changes nothing.
    pub fn is_empty(&self) -> bool {
        !self.subject_changed && self.len() == 0
    }

    /// Number of assertion-level changes.
    pub fn len(&self) -> usize {
        self.additions + self.deletions + self.edits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiffEngine;

    #[test]
    fn no_change_is_empty() {
        let summary = DiffSummary::of(&vocab::no_change()).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.len(), 0);
    }

    #[test]
    fn counts_each_kind() {
        let source = Envelope::new("alice")
            .add_assertion_pair("knows", "bob")
            .add_assertion_pair("age", 30);
        let target = Envelope::new("alice")
            .add_assertion_pair("age", 31)
            .add_assertion_pair("city", "paris")
            .add_assertion_pair("likes", "tea");
        let diff = DiffEngine::new().diff(&source, &target);
        let summary = DiffSummary::of(&diff).unwrap();

        assert!(!summary.subject_changed);
        assert_eq!(summary.edits + summary.deletions, 2);
        assert_eq!(summary.edits + summary.additions, 3);
        assert!(!summary.is_empty());
    }

    #[test]
    fn replacement_marks_subject() {
        let diff = DiffEngine::new().diff(&Envelope::new("alice"), &Envelope::new("bob"));
        let summary = DiffSummary::of(&diff).unwrap();
        assert!(summary.subject_changed);
        assert_eq!(summary.len(), 0);
    }

    #[test]
    fn unknown_tags_are_reported() {
        let diff = vocab::no_change().add_assertion_pair("bogus", 1);
        assert!(DiffSummary::of(&diff).is_err());
    }
}
