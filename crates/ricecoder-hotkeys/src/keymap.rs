//! Keymap: pattern strings bound to actions, in declaration order

use std::collections::HashMap;
use std::path::Path;

use crate::error::KeymapError;
use crate::models::KeySeq;
use crate::parser::{parse_key_seq, KeybindEntry, ParserRegistry};

/// One pattern string and every action bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapEntry {
    pub pattern: String,
    pub seq: KeySeq,
    pub actions: Vec<String>,
}

/// Ordered mapping from pattern string to actions
///
/// Binding a second action to the same exact string keeps both; the conflict
/// detector reports it as a duplicate.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    entries: Vec<KeymapEntry>,
    by_pattern: HashMap<String, usize>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a keymap from `(pattern, action)` pairs, skipping invalid ones
    pub fn from_pairs<I, P, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, A)>,
        P: AsRef<str>,
        A: Into<String>,
    {
        let mut keymap = Keymap::new();
        for (pattern, action) in pairs {
            if let Err(e) = keymap.bind(pattern.as_ref(), action) {
                tracing::warn!(pattern = pattern.as_ref(), "skipping binding: {}", e);
            }
        }
        keymap
    }

    /// Build a keymap from parsed document entries
    pub fn from_entries(entries: &[KeybindEntry]) -> Result<Self, KeymapError> {
        let mut keymap = Keymap::new();
        for entry in entries {
            keymap.bind(&entry.key, entry.action_id.clone())?;
        }
        Ok(keymap)
    }

    /// Load a keymap document, choosing the parser by file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeymapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let parsers = ParserRegistry::new();
        let entries = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => parsers.parse(&content, &ext.to_lowercase())?,
            None => parsers.parse_auto(&content)?,
        };
        Self::from_entries(&entries)
    }

    /// Bind an action to a pattern string
    pub fn bind(&mut self, pattern: &str, action: impl Into<String>) -> Result<(), KeymapError> {
        let pattern = pattern.trim();
        let action = action.into();
        if action.trim().is_empty() {
            return Err(KeymapError::EmptyAction);
        }
        let seq = parse_key_seq(pattern);
        if seq.is_empty() {
            return Err(KeymapError::EmptyPattern);
        }

        match self.by_pattern.get(pattern) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                if !entry.actions.contains(&action) {
                    entry.actions.push(action);
                }
            }
            None => {
                self.by_pattern.insert(pattern.to_string(), self.entries.len());
                self.entries.push(KeymapEntry {
                    pattern: pattern.to_string(),
                    seq,
                    actions: vec![action],
                });
            }
        }
        Ok(())
    }

    /// Remove every binding of an action. Returns the patterns it was bound to.
    pub fn unbind_action(&mut self, action: &str) -> Vec<String> {
        let mut removed = Vec::new();
        for entry in &mut self.entries {
            let before = entry.actions.len();
            entry.actions.retain(|a| a != action);
            if entry.actions.len() != before {
                removed.push(entry.pattern.clone());
            }
        }
        if !removed.is_empty() {
            self.entries.retain(|entry| !entry.actions.is_empty());
            self.reindex();
        }
        removed
    }

    /// Replace an action's bindings with a single pattern, or disable it with `None`
    pub fn rebind_action(&mut self, action: &str, pattern: Option<&str>) -> Result<(), KeymapError> {
        self.unbind_action(action);
        match pattern {
            Some(pattern) => self.bind(pattern, action),
            None => Ok(()),
        }
    }

    fn reindex(&mut self) {
        self.by_pattern = self
            .entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.pattern.clone(), idx))
            .collect();
    }

    pub fn get(&self, pattern: &str) -> Option<&KeymapEntry> {
        self.by_pattern.get(pattern.trim()).map(|&idx| &self.entries[idx])
    }

    /// Patterns bound to an action, in declaration order
    pub fn patterns_for_action(&self, action: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.actions.iter().any(|a| a == action))
            .map(|entry| entry.pattern.as_str())
            .collect()
    }

    pub fn entries(&self) -> &[KeymapEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> Option<&KeymapEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
