//! Static conflict detection over a complete keymap

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::keymap::Keymap;
use crate::models::{KeyCombination, KeySeq, SeqElem};

/// Every conflict a single pattern string takes part in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictInfo {
    /// Actions bound to this exact string, when more than one
    pub duplicates: Vec<String>,
    /// Other patterns that match exactly the same input
    pub overlaps: BTreeSet<String>,
    /// Longer patterns this one is a prefix of
    pub prefix_of: BTreeSet<String>,
    /// Shorter patterns that are a prefix of this one
    pub has_prefix: BTreeSet<String>,
}

impl ConflictInfo {
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
            && self.overlaps.is_empty()
            && self.prefix_of.is_empty()
            && self.has_prefix.is_empty()
    }

    pub fn kinds(&self) -> Vec<ConflictKind> {
        let mut kinds = Vec::new();
        if !self.duplicates.is_empty() {
            kinds.push(ConflictKind::Duplicate);
        }
        if !self.overlaps.is_empty() {
            kinds.push(ConflictKind::PatternOverlap);
        }
        if !self.prefix_of.is_empty() || !self.has_prefix.is_empty() {
            kinds.push(ConflictKind::PrefixRelation);
        }
        kinds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConflictKind {
    Duplicate,
    PatternOverlap,
    PrefixRelation,
}

/// Whether two pattern elements could match the same physical keypress
pub fn elems_compatible(a: &SeqElem, b: &SeqElem) -> bool {
    match (a, b) {
        (SeqElem::Key(x), SeqElem::Key(y)) => x == y,
        (SeqElem::Key(k), SeqElem::Digit | SeqElem::Digits)
        | (SeqElem::Digit | SeqElem::Digits, SeqElem::Key(k)) => k.is_bare_digit(),
        (SeqElem::Digit | SeqElem::Digits, SeqElem::Digit | SeqElem::Digits) => true,
    }
}

/// Whether a pattern element could match a concrete key combination
pub(crate) fn elem_accepts(elem: &SeqElem, combo: &KeyCombination) -> bool {
    match elem {
        SeqElem::Key(k) => k == combo,
        SeqElem::Digit | SeqElem::Digits => combo.is_bare_digit(),
    }
}

fn prefix_compatible(short: &KeySeq, long: &KeySeq) -> bool {
    short
        .elems()
        .iter()
        .zip(long.elems())
        .all(|(a, b)| elems_compatible(a, b))
}

/// Detects duplicate, overlapping and prefix related bindings
pub struct ConflictDetector;

impl ConflictDetector {
    /// Detect all conflicts in a keymap.
    ///
    /// Only patterns that take part in at least one conflict appear in the result.
    pub fn detect(keymap: &Keymap) -> BTreeMap<String, ConflictInfo> {
        // Sorted by pattern string so the result never depends on declaration order
        let mut patterns: Vec<(&str, &KeySeq, &[String])> = keymap
            .entries()
            .iter()
            .filter(|entry| !entry.seq.is_empty())
            .map(|entry| (entry.pattern.as_str(), &entry.seq, entry.actions.as_slice()))
            .collect();
        patterns.sort_by(|a, b| a.0.cmp(b.0));

        let mut conflicts: BTreeMap<String, ConflictInfo> = BTreeMap::new();

        for (pattern, _, actions) in &patterns {
            if actions.len() > 1 {
                let mut duplicates = actions.to_vec();
                duplicates.sort();
                duplicates.dedup();
                conflicts.entry(pattern.to_string()).or_default().duplicates = duplicates;
            }
        }

        for (i, (a_pattern, a_seq, _)) in patterns.iter().enumerate() {
            for (b_pattern, b_seq, _) in &patterns[i + 1..] {
                if a_seq.len() == b_seq.len() {
                    if prefix_compatible(a_seq, b_seq) {
                        conflicts
                            .entry(a_pattern.to_string())
                            .or_default()
                            .overlaps
                            .insert(b_pattern.to_string());
                        conflicts
                            .entry(b_pattern.to_string())
                            .or_default()
                            .overlaps
                            .insert(a_pattern.to_string());
                    }
                    continue;
                }

                let (short, long) = if a_seq.len() < b_seq.len() {
                    ((a_pattern, a_seq), (b_pattern, b_seq))
                } else {
                    ((b_pattern, b_seq), (a_pattern, a_seq))
                };
                if prefix_compatible(short.1, long.1) {
                    conflicts
                        .entry(short.0.to_string())
                        .or_default()
                        .prefix_of
                        .insert(long.0.to_string());
                    conflicts
                        .entry(long.0.to_string())
                        .or_default()
                        .has_prefix
                        .insert(short.0.to_string());
                }
            }
        }

        tracing::debug!(count = conflicts.len(), "detected hotkey conflicts");
        conflicts
    }

    /// Conflicts for a prospective binding, without modifying the keymap
    pub fn check_binding(keymap: &Keymap, pattern: &str, action: &str) -> Option<ConflictInfo> {
        let mut candidate = keymap.clone();
        candidate.bind(pattern, action).ok()?;
        Self::detect(&candidate).remove(pattern.trim())
    }
}
