//! Pairing of source and target assertions.
//!
//! Unique source assertions are visited in digest order. Each one takes the
//! remaining unique target assertion whose pairwise edit has the fewest
//! elements; ties go to the lowest target digest. Sources left without a
//! partner become deletions and targets never chosen become additions.
//!
//! Entries are applied one level below the diff that carries them, and an
//! edit wrapped in an `assertion` sub-entry one level further still.

use std::collections::BTreeMap;

use envl_core::Envelope;
use envl_types::Digest;
use tracing::{debug, trace};

use crate::engine::DiffEngine;
use crate::vocab::{self, SubEntryLabel};

impl DiffEngine {
    /// Diff two envelopes through their assertion sets and subjects.
    pub(crate) fn diff_assertion_sets(
        &self,
        source: &Envelope,
        target: &Envelope,
        depth: usize,
    ) -> Envelope {
        let empty = BTreeMap::new();
        let source_set = source.assertion_map().unwrap_or(&empty);
        let target_set = target.assertion_map().unwrap_or(&empty);

        let mut remaining: BTreeMap<Digest, Envelope> = target_set
            .iter()
            .filter(|(digest, _)| !source_set.contains_key(digest))
            .map(|(digest, assertion)| (*digest, assertion.clone()))
            .collect();

        let mut entries = Vec::new();
        let (mut edits, mut deletions) = (0usize, 0usize);
        for (digest, assertion) in source_set {
            if target_set.contains_key(digest) {
                continue;
            }
            match self.best_match(assertion, &remaining, depth + 1) {
                Some((matched, edit)) => {
                    trace!(
                        source = %digest.short_hex(),
                        target = %matched.short_hex(),
                        "paired assertions"
                    );
                    remaining.remove(&matched);
                    entries.push(edit);
                    edits += 1;
                }
                None => {
                    entries.push(vocab::delete_entry(digest));
                    deletions += 1;
                }
            }
        }
        let additions = remaining.len();
        entries.extend(remaining.values().map(vocab::add_entry));

        let subject = self.diff_at(&source.subject(), &target.subject(), depth);
        debug!(
            sources = source_set.len(),
            targets = target_set.len(),
            edits,
            deletions,
            additions,
            depth,
            "diffed assertion sets"
        );
        vocab::attach_entries(&subject, &entries)
    }

    /// The cheapest edit from `source` to one of `candidates`, with the
    /// chosen candidate's digest.
    fn best_match(
        &self,
        source: &Envelope,
        candidates: &BTreeMap<Digest, Envelope>,
        depth: usize,
    ) -> Option<(Digest, Envelope)> {
        let mut best: Option<(usize, Digest, Envelope)> = None;
        for (digest, candidate) in candidates {
            let edit = self.assertion_edit(source, candidate, depth);
            let cost = edit.elements_count();
            if best.as_ref().map_or(true, |(lowest, _, _)| cost < *lowest) {
                best = Some((cost, *digest, edit));
            }
        }
        best.map(|(_, digest, edit)| (digest, edit))
    }

    /// An edit entry turning assertion `source` into `target`, applied at
    /// `depth`.
    ///
    /// The recursive diff already is one when it is edit-tagged with the
    /// source digest. Anything else (a node diff whose edit tag points at the
    /// subject, or a bare replacement) is carried in an `assertion`
    /// sub-entry, or replaced verbatim when there is no room left for it.
    fn assertion_edit(&self, source: &Envelope, target: &Envelope, depth: usize) -> Envelope {
        if self.edits_in_place(source, target, depth) {
            return self.diff_at(source, target, depth);
        }
        if self.at_limit(depth) {
            return vocab::replacement(source, target);
        }
        vocab::with_sub_entry(
            &vocab::edit_tag(source.digest()),
            SubEntryLabel::Assertion,
            self.diff_at(source, target, depth + 1),
        )
    }
}
