//! Core data models for hotkey patterns and key events

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Modifier flags held during a keypress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    /// True when no modifier is held
    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.meta)
    }

    /// Union of two sets of flags
    pub fn union(self, other: Modifiers) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }

    /// Set the flag named by a modifier alias. Returns false for unknown names.
    pub(crate) fn set_alias(&mut self, alias: &str) -> bool {
        match alias.to_lowercase().as_str() {
            "ctrl" | "control" => self.ctrl = true,
            "alt" | "option" | "opt" => self.alt = true,
            "shift" => self.shift = true,
            "meta" | "cmd" | "command" | "super" => self.meta = true,
            _ => return false,
        }
        true
    }
}

/// Platform family used for display formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "mac")]
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOS
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

/// A single key plus the modifiers held with it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyCombination {
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyCombination {
    /// Create a combination, normalizing the key name
    pub fn new(key: impl AsRef<str>, modifiers: Modifiers) -> Self {
        KeyCombination {
            key: normalize_key(key.as_ref()),
            modifiers,
        }
    }

    /// A combination without modifiers
    pub fn bare(key: impl AsRef<str>) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// True for a single digit with no modifiers
    pub fn is_bare_digit(&self) -> bool {
        self.modifiers.is_empty() && self.digit().is_some()
    }

    /// The digit value of the key, ignoring modifiers
    pub fn digit(&self) -> Option<u32> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_digit(10),
            _ => None,
        }
    }

    /// True when the key is `name` and no modifier is held
    pub fn is_bare(&self, name: &str) -> bool {
        self.modifiers.is_empty() && self.key == name
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::combination_id(self))
    }
}

/// One element of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeqElem {
    /// A literal key combination
    Key(KeyCombination),
    /// Exactly one digit 0-9
    Digit,
    /// One or more consecutive digits, matched greedily
    Digits,
}

impl SeqElem {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, SeqElem::Digit | SeqElem::Digits)
    }
}

impl From<KeyCombination> for SeqElem {
    fn from(combo: KeyCombination) -> Self {
        SeqElem::Key(combo)
    }
}

/// A parsed hotkey pattern
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySeq(pub Vec<SeqElem>);

impl KeySeq {
    pub fn new(elems: Vec<SeqElem>) -> Self {
        KeySeq(elems)
    }

    pub fn elems(&self) -> &[SeqElem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_placeholders(&self) -> bool {
        self.0.iter().any(SeqElem::is_placeholder)
    }

    /// Canonical id string, e.g. `ctrl+k \d+ g`
    pub fn id(&self) -> String {
        crate::format::seq_id(self)
    }
}

impl FromStr for KeySeq {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(crate::parser::parse_key_seq(s))
    }
}

impl fmt::Display for KeySeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl From<Vec<SeqElem>> for KeySeq {
    fn from(elems: Vec<SeqElem>) -> Self {
        KeySeq(elems)
    }
}

/// Whether a raw key went down or came up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A discrete keyboard event delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Normalized key name
    pub key: String,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
    /// The event is aimed at a text field or other editable control
    pub targets_editable: bool,
}

impl KeyEvent {
    pub fn down(key: impl AsRef<str>, modifiers: Modifiers) -> Self {
        KeyEvent {
            key: normalize_key(key.as_ref()),
            modifiers,
            kind: KeyEventKind::Down,
            targets_editable: false,
        }
    }

    pub fn up(key: impl AsRef<str>, modifiers: Modifiers) -> Self {
        KeyEvent {
            kind: KeyEventKind::Up,
            ..Self::down(key, modifiers)
        }
    }

    /// Mark the event as aimed at an editable control
    pub fn in_editable(mut self) -> Self {
        self.targets_editable = true;
        self
    }

    pub fn combination(&self) -> KeyCombination {
        KeyCombination {
            key: self.key.clone(),
            modifiers: self.modifiers,
        }
    }

    pub fn is_modifier_key(&self) -> bool {
        is_modifier_key(&self.key)
    }
}

/// Normalize a key name to its canonical lowercase form
pub fn normalize_key(key: &str) -> String {
    if key == " " {
        return "space".to_string();
    }
    let lower = key.trim().to_lowercase();
    match lower.as_str() {
        "arrowup" | "uparrow" => "up",
        "arrowdown" | "downarrow" => "down",
        "arrowleft" | "leftarrow" => "left",
        "arrowright" | "rightarrow" => "right",
        "return" => "enter",
        "esc" => "escape",
        "back" | "bksp" => "backspace",
        "del" => "delete",
        "spacebar" => "space",
        "pgup" => "pageup",
        "pgdn" => "pagedown",
        "control" => "ctrl",
        "option" => "alt",
        "cmd" | "command" | "os" | "super" => "meta",
        _ => return lower,
    }
    .to_string()
}

/// True for keys that only act as modifiers
pub fn is_modifier_key(key: &str) -> bool {
    matches!(
        key,
        "ctrl" | "control" | "alt" | "option" | "shift" | "meta" | "cmd" | "command" | "os"
            | "super" | "altgraph" | "capslock" | "fn"
    )
}

/// Modifier flag contributed by a held modifier key
pub(crate) fn modifier_for_key(key: &str) -> Modifiers {
    let mut modifiers = Modifiers::NONE;
    modifiers.set_alias(key);
    modifiers
}

/// Characters that already imply Shift on a standard layout
pub fn is_shifted_symbol(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => "~!@#$%^&*()_+{}|:\"<>?".contains(c),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_key("ArrowUp"), "up");
        assert_eq!(normalize_key("Return"), "enter");
        assert_eq!(normalize_key("Esc"), "escape");
        assert_eq!(normalize_key(" "), "space");
        assert_eq!(normalize_key("K"), "k");
        assert_eq!(normalize_key("F5"), "f5");
    }

    #[test]
    fn test_bare_digit() {
        assert!(KeyCombination::bare("7").is_bare_digit());
        assert!(!KeyCombination::new("7", Modifiers::ctrl()).is_bare_digit());
        assert!(!KeyCombination::bare("x").is_bare_digit());
        assert!(!KeyCombination::bare("f1").is_bare_digit());
    }

    #[test]
    fn test_shifted_symbols() {
        assert!(is_shifted_symbol("#"));
        assert!(is_shifted_symbol("?"));
        assert!(!is_shifted_symbol("/"));
        assert!(!is_shifted_symbol("a"));
    }

    #[test]
    fn test_modifier_keys() {
        assert!(is_modifier_key("shift"));
        assert!(is_modifier_key("meta"));
        assert!(!is_modifier_key("s"));
        assert!(modifier_for_key("ctrl").ctrl);
        assert!(modifier_for_key("s").is_empty());
    }
}
