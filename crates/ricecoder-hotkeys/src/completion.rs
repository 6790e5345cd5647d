//! "What comes next" for a partially typed sequence

use serde::Serialize;

use crate::conflict::elem_accepts;
use crate::format::{format_elems, FormattedSeq};
use crate::keymap::Keymap;
use crate::models::{KeyCombination, KeySeq, Platform, SeqElem};
use crate::registry::ActionRegistry;

/// A pattern the pending keys lead to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Completion {
    /// The pending keys match the whole pattern
    Complete { pattern: String, actions: Vec<String> },
    /// The pending keys are a strict prefix; `remaining` is what is left to type
    Continuation {
        pattern: String,
        actions: Vec<String>,
        remaining: FormattedSeq,
    },
}

impl Completion {
    pub fn pattern(&self) -> &str {
        match self {
            Completion::Complete { pattern, .. } | Completion::Continuation { pattern, .. } => pattern,
        }
    }

    pub fn actions(&self) -> &[String] {
        match self {
            Completion::Complete { actions, .. } | Completion::Continuation { actions, .. } => actions,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Completion::Complete { .. })
    }

    fn actions_mut(&mut self) -> &mut Vec<String> {
        match self {
            Completion::Complete { actions, .. } | Completion::Continuation { actions, .. } => actions,
        }
    }
}

/// Number of pattern elements consumed by `pending`, if it is a compatible prefix
fn consume(seq: &KeySeq, pending: &[KeyCombination]) -> Option<usize> {
    let elems = seq.elems();
    let mut pos = 0;
    let mut i = 0;
    while i < pending.len() {
        let elem = elems.get(pos)?;
        if !elem_accepts(elem, &pending[i]) {
            return None;
        }
        i += 1;
        if matches!(elem, SeqElem::Digits) {
            while pending.get(i).is_some_and(KeyCombination::is_bare_digit) {
                i += 1;
            }
        }
        pos += 1;
    }
    Some(pos)
}

pub struct CompletionResolver;

impl CompletionResolver {
    /// Complete matches first, then continuations, each sorted by pattern string
    pub fn resolve(pending: &[KeyCombination], keymap: &Keymap, platform: Platform) -> Vec<Completion> {
        let mut completions: Vec<Completion> = keymap
            .entries()
            .iter()
            .filter(|entry| !entry.seq.is_empty())
            .filter_map(|entry| {
                let consumed = consume(&entry.seq, pending)?;
                let elems = entry.seq.elems();
                Some(if consumed == elems.len() {
                    Completion::Complete {
                        pattern: entry.pattern.clone(),
                        actions: entry.actions.clone(),
                    }
                } else {
                    Completion::Continuation {
                        pattern: entry.pattern.clone(),
                        actions: entry.actions.clone(),
                        remaining: format_elems(&elems[consumed..], platform),
                    }
                })
            })
            .collect();

        completions.sort_by(|a, b| {
            b.is_complete()
                .cmp(&a.is_complete())
                .then_with(|| a.pattern().cmp(b.pattern()))
        });
        completions
    }

    /// Like [`CompletionResolver::resolve`], keeping only enabled actions
    pub fn resolve_enabled(
        pending: &[KeyCombination],
        keymap: &Keymap,
        platform: Platform,
        registry: &dyn ActionRegistry,
    ) -> Vec<Completion> {
        Self::resolve(pending, keymap, platform)
            .into_iter()
            .filter_map(|mut completion| {
                completion.actions_mut().retain(|action| registry.is_enabled(action));
                (!completion.actions().is_empty()).then_some(completion)
            })
            .collect()
    }
}
