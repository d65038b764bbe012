//! The diff envelope vocabulary.
//!
//! A diff is itself an envelope. Its subject is one of:
//!
//! - `"noChange"` -- keep the source subject
//! - `"edit": <digest>` -- edit the envelope (or subject) with that digest
//! - anything else -- the replacement subject
//!
//! Its assertions are entries: `"add": <assertion>`, `"delete": <digest>`,
//! or an edit (`"edit": <digest>`, possibly carrying sub-entries). Sub-entries
//! labelled `"predicate"`, `"object"`, or `"assertion"` hold nested diffs; a
//! `"replacement"` sub-entry holds the new envelope verbatim and is what the
//! engines fall back to at the depth limit.
//!
//! Two literals are reserved: a replacement subject equal to `"noChange"`,
//! and an assertion with predicate `"edit"` and a digest object. An `"edit"`
//! assertion whose object is anything else is ordinary content.

use envl_core::Envelope;
use envl_types::Digest;

use crate::error::{InvalidDiff, PatchResult};

pub const NO_CHANGE: &str = "noChange";
pub const EDIT: &str = "edit";
pub const ADD: &str = "add";
pub const DELETE: &str = "delete";
pub const PREDICATE: &str = "predicate";
pub const OBJECT: &str = "object";
pub const ASSERTION: &str = "assertion";
pub const REPLACEMENT: &str = "replacement";

/// Tag of a diff entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffTag {
    Add,
    Delete,
    Edit,
}

impl DiffTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => ADD,
            Self::Delete => DELETE,
            Self::Edit => EDIT,
        }
    }
}

/// Label of a sub-entry of an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubEntryLabel {
    Predicate,
    Object,
    Assertion,
    Replacement,
}

impl SubEntryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Predicate => PREDICATE,
            Self::Object => OBJECT,
            Self::Assertion => ASSERTION,
            Self::Replacement => REPLACEMENT,
        }
    }
}

/// What an assertion of a diff envelope is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Tagged(DiffTag),
    SubEntry(SubEntryLabel),
}

/// The `noChange` sentinel.
pub fn no_change() -> Envelope {
    Envelope::new(NO_CHANGE)
}

pub fn is_no_change(envelope: &Envelope) -> bool {
    *envelope == no_change()
}

/// `"edit": <digest>`
pub fn edit_tag(digest: &Digest) -> Envelope {
    Envelope::new_assertion(EDIT, *digest)
}

/// `"add": <assertion>`
pub fn add_entry(assertion: &Envelope) -> Envelope {
    Envelope::new_assertion(ADD, assertion)
}

/// `"delete": <digest>`
pub fn delete_entry(digest: &Digest) -> Envelope {
    Envelope::new_assertion(DELETE, *digest)
}

/// Attach a labelled sub-diff to an edit.
pub fn with_sub_entry(edit: &Envelope, label: SubEntryLabel, diff: Envelope) -> Envelope {
    edit.add_assertion_pair(label.as_str(), diff)
}

/// `"edit": <digest of source>` with `target` as a verbatim `replacement`.
pub fn replacement(source: &Envelope, target: &Envelope) -> Envelope {
    with_sub_entry(
        &edit_tag(source.digest()),
        SubEntryLabel::Replacement,
        target.clone(),
    )
}

/// Attach diff entries to a diff subject. Entries built by this module are
/// always assertion-shaped.
pub fn attach_entries(subject: &Envelope, entries: &[Envelope]) -> Envelope {
    subject
        .add_assertions(entries)
        .expect("diff entries are assertion-shaped")
}

/// Classify an assertion of a diff envelope by its predicate.
pub fn classify(entry: &Envelope) -> PatchResult<EntryKind> {
    let predicate = entry.predicate().ok_or(InvalidDiff::Untagged)?;
    let label: String = predicate
        .extract_subject()
        .map_err(|_| InvalidDiff::UnknownTag(predicate.summary()))?;
    match label.as_str() {
        ADD => Ok(EntryKind::Tagged(DiffTag::Add)),
        DELETE => Ok(EntryKind::Tagged(DiffTag::Delete)),
        EDIT => Ok(EntryKind::Tagged(DiffTag::Edit)),
        PREDICATE => Ok(EntryKind::SubEntry(SubEntryLabel::Predicate)),
        OBJECT => Ok(EntryKind::SubEntry(SubEntryLabel::Object)),
        ASSERTION => Ok(EntryKind::SubEntry(SubEntryLabel::Assertion)),
        REPLACEMENT => Ok(EntryKind::SubEntry(SubEntryLabel::Replacement)),
        _ => Err(InvalidDiff::UnknownTag(label)),
    }
}

/// The digest referenced by an edit-tagged subject, if the subject is one.
///
/// Only `"edit": <digest>` is a tag; an `"edit"` assertion with any other
/// object is not.
pub fn edit_reference(diff: &Envelope) -> Option<Digest> {
    let (predicate, object) = (diff.predicate()?, diff.object()?);
    if predicate != Envelope::new(EDIT) {
        return None;
    }
    object.extract_subject().ok()
}

/// The diff stored under `label`, if the edit carries one.
pub fn sub_entry(edit: &Envelope, label: SubEntryLabel) -> PatchResult<Option<Envelope>> {
    match edit.object_for_predicate(label.as_str()) {
        Ok(diff) => Ok(Some(diff)),
        Err(envl_core::EnvelopeError::NonexistentPredicate) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
