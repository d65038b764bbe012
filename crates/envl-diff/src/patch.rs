//! Patch application: rebuild a target from a source and a diff.
//!
//! A diff is fully validated against the source before anything is built.
//! Every entry is turned into a [`PatchOp`] first; the ops are executed only
//! once the whole plan is known to be valid, so a malformed diff never yields
//! a partially patched envelope.
//!
//! Every nested diff is applied one level deeper than the diff that holds
//! it, and anything past [`DiffConfig::max_depth`] is rejected. A diff made
//! by a [`DiffEngine`](crate::DiffEngine) with the same config never goes
//! that deep.

use envl_core::{Envelope, EnvelopeCase};
use envl_types::Digest;
use tracing::{debug, trace, warn};

use crate::config::DiffConfig;
use crate::error::{InvalidDiff, PatchResult};
use crate::vocab::{self, DiffTag, EntryKind, SubEntryLabel};

/// One validated change to an assertion set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOp {
    Add(Envelope),
    Delete(Digest),
    Replace { old: Digest, new: Envelope },
}

/// A base envelope and the ops still to run against it.
#[derive(Debug)]
struct PatchPlan {
    base: Envelope,
    ops: Vec<PatchOp>,
}

impl PatchPlan {
    fn execute(self) -> PatchResult<Envelope> {
        self.ops
            .into_iter()
            .try_fold(self.base, |envelope, op| match op {
                PatchOp::Add(assertion) => Ok(envelope.add_assertion(&assertion)?),
                PatchOp::Delete(digest) => Ok(envelope.remove_assertion(&digest)),
                PatchOp::Replace { old, new } => Ok(envelope.replace_assertion(&old, &new)?),
            })
    }
}

/// Applies diff envelopes.
#[derive(Clone, Debug, Default)]
pub struct PatchEngine {
    config: DiffConfig,
}

impl PatchEngine {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that rejects diffs nested deeper than `config` allows.
    pub fn with_config(config: DiffConfig) -> Self {
        Self { config }
    }

    /// The configuration this engine patches under.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Apply `diff` to `source`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDiff`] if the diff is not well-formed or does not fit
    /// the source (unknown tags, missing assertions, mismatched edit targets).
    pub fn apply(&self, source: &Envelope, diff: &Envelope) -> PatchResult<Envelope> {
        let result = self.apply_at(source, diff, 0);
        match &result {
            Ok(patched) => debug!(
                source = %source.digest().short_hex(),
                result = %patched.digest().short_hex(),
                "applied diff"
            ),
            Err(e) => warn!(source = %source.digest().short_hex(), error = %e, "diff rejected"),
        }
        result
    }

    fn apply_at(&self, source: &Envelope, diff: &Envelope, depth: usize) -> PatchResult<Envelope> {
        if depth > self.config.max_depth {
            return Err(InvalidDiff::DepthExceeded(self.config.max_depth));
        }
        let plan = self.plan(source, diff, depth + 1)?;
        trace!(ops = plan.ops.len(), depth, "executing patch plan");
        plan.execute()
    }

    fn plan(&self, source: &Envelope, diff: &Envelope, depth: usize) -> PatchResult<PatchPlan> {
        let edit_reference = vocab::edit_reference(diff);
        let base = match edit_reference {
            Some(digest) if digest == *source.digest() => {
                self.apply_sub_entries(source, diff, depth)?
            }
            Some(digest) if digest == *source.subject().digest() => {
                let subject = self.apply_sub_entries(&source.subject(), diff, depth)?;
                source.replace_subject(&subject)
            }
            Some(digest) => {
                return Err(InvalidDiff::EditTargetMismatch {
                    referenced: digest,
                    actual: *source.digest(),
                })
            }
            None if vocab::is_no_change(&diff.subject()) => source.clone(),
            None => {
                let subject = self.patch_subject(&source.subject(), &diff.subject(), depth)?;
                source.replace_subject(&subject)
            }
        };

        let mut ops = Vec::new();
        for entry in diff.assertions() {
            match vocab::classify(&entry)? {
                // sub-entries belong to the edit-tagged subject
                EntryKind::SubEntry(_) if edit_reference.is_some() => {}
                EntryKind::SubEntry(label) => {
                    return Err(InvalidDiff::UnknownTag(label.as_str().to_string()))
                }
                EntryKind::Tagged(DiffTag::Add) => {
                    let assertion = entry_object(&entry)?;
                    ensure_assertion_shaped(&assertion)?;
                    ops.push(PatchOp::Add(assertion));
                }
                EntryKind::Tagged(DiffTag::Delete) => {
                    let digest: Digest = entry_object(&entry)?.extract_subject()?;
                    original_assertion(source, &digest)?;
                    ops.push(PatchOp::Delete(digest));
                }
                EntryKind::Tagged(DiffTag::Edit) => {
                    let digest: Digest = entry_object(&entry)?.extract_subject()?;
                    let original = original_assertion(source, &digest)?;
                    let new = self.apply_at(&original, &entry, depth)?;
                    ensure_assertion_shaped(&new)?;
                    ops.push(PatchOp::Replace { old: digest, new });
                }
            }
        }
        Ok(PatchPlan { base, ops })
    }

    /// A wrapped diff subject against a wrapped source subject is a diff of
    /// the wrapped contents; any other diff subject replaces the subject.
    fn patch_subject(
        &self,
        subject: &Envelope,
        diff_subject: &Envelope,
        depth: usize,
    ) -> PatchResult<Envelope> {
        match (subject.case(), diff_subject.case()) {
            (
                EnvelopeCase::Wrapped { envelope: inner, .. },
                EnvelopeCase::Wrapped {
                    envelope: inner_diff,
                    ..
                },
            ) => Ok(self.apply_at(inner, inner_diff, depth)?.wrap()),
            _ => Ok(diff_subject.clone()),
        }
    }

    /// Run the sub-entries of an edit against `target`.
    ///
    /// A `replacement` sub-entry is the result as is, and an `assertion`
    /// sub-entry is a diff of the whole target. Otherwise the
    /// `predicate` and `object` sub-entries (either may be absent) diff the
    /// parts of an assertion.
    fn apply_sub_entries(
        &self,
        target: &Envelope,
        edit: &Envelope,
        depth: usize,
    ) -> PatchResult<Envelope> {
        if let Some(replacement) = vocab::sub_entry(edit, SubEntryLabel::Replacement)? {
            return Ok(replacement);
        }
        if let Some(diff) = vocab::sub_entry(edit, SubEntryLabel::Assertion)? {
            return self.apply_at(target, &diff, depth);
        }
        let predicate_diff = vocab::sub_entry(edit, SubEntryLabel::Predicate)?;
        let object_diff = vocab::sub_entry(edit, SubEntryLabel::Object)?;
        if predicate_diff.is_none() && object_diff.is_none() {
            return Ok(target.clone());
        }

        let assertion = target.as_assertion().ok_or(InvalidDiff::NotAnAssertion)?;
        let predicate = match predicate_diff {
            Some(diff) => self.apply_at(assertion.predicate(), &diff, depth)?,
            None => assertion.predicate().clone(),
        };
        let object = match object_diff {
            Some(diff) => self.apply_at(assertion.object(), &diff, depth)?,
            None => assertion.object().clone(),
        };
        Ok(Envelope::new_assertion(predicate, object))
    }
}

fn entry_object(entry: &Envelope) -> PatchResult<Envelope> {
    entry.object().ok_or(InvalidDiff::Untagged)
}

fn original_assertion(source: &Envelope, digest: &Digest) -> PatchResult<Envelope> {
    source
        .assertion_with_digest(digest)
        .map_err(|_| InvalidDiff::MissingAssertion(*digest))
}

fn ensure_assertion_shaped(envelope: &Envelope) -> PatchResult<()> {
    if envelope.is_subject_assertion() || envelope.is_subject_obscured() {
        Ok(())
    } else {
        Err(InvalidDiff::NotAnAssertion)
    }
}
