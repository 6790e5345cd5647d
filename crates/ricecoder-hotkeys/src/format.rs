//! Display and canonical formatting for patterns
//!
//! The canonical id is the storage and equality form: lowercase, modifiers in
//! the fixed order `ctrl+alt+shift+meta`, elements separated by one space.
//! Parsing an id gives back the pattern it was produced from.

use serde::Serialize;

use crate::models::{KeyCombination, KeySeq, Platform, SeqElem};

pub const DIGIT_DISPLAY: &str = "⟨#⟩";
pub const DIGITS_DISPLAY: &str = "⟨##⟩";
pub const DIGIT_ID: &str = r"\d";
pub const DIGITS_ID: &str = r"\d+";

/// A pattern rendered for people and for storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedSeq {
    pub display: String,
    pub id: String,
}

/// Render a pattern for the given platform
pub fn format_key_seq(seq: &KeySeq, platform: Platform) -> FormattedSeq {
    format_elems(seq.elems(), platform)
}

pub(crate) fn format_elems(elems: &[SeqElem], platform: Platform) -> FormattedSeq {
    FormattedSeq {
        display: elems
            .iter()
            .map(|elem| elem_display(elem, platform))
            .collect::<Vec<_>>()
            .join(" "),
        id: elems.iter().map(elem_id).collect::<Vec<_>>().join(" "),
    }
}

/// Render pending key combinations
pub fn format_combinations(combos: &[KeyCombination], platform: Platform) -> FormattedSeq {
    FormattedSeq {
        display: combos
            .iter()
            .map(|c| combination_display(c, platform))
            .collect::<Vec<_>>()
            .join(" "),
        id: combos.iter().map(combination_id).collect::<Vec<_>>().join(" "),
    }
}

pub fn seq_id(seq: &KeySeq) -> String {
    seq.elems().iter().map(elem_id).collect::<Vec<_>>().join(" ")
}

fn elem_id(elem: &SeqElem) -> String {
    match elem {
        SeqElem::Key(combo) => combination_id(combo),
        SeqElem::Digit => DIGIT_ID.to_string(),
        SeqElem::Digits => DIGITS_ID.to_string(),
    }
}

fn elem_display(elem: &SeqElem, platform: Platform) -> String {
    match elem {
        SeqElem::Key(combo) => combination_display(combo, platform),
        SeqElem::Digit => DIGIT_DISPLAY.to_string(),
        SeqElem::Digits => DIGITS_DISPLAY.to_string(),
    }
}

/// Canonical id of a single combination, e.g. `ctrl+shift+k`
pub fn combination_id(combo: &KeyCombination) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(5);
    if combo.modifiers.ctrl {
        parts.push("ctrl");
    }
    if combo.modifiers.alt {
        parts.push("alt");
    }
    if combo.modifiers.shift {
        parts.push("shift");
    }
    if combo.modifiers.meta {
        parts.push("meta");
    }
    parts.push(&combo.key);
    parts.join("+")
}

/// Platform aware display of a single combination
pub fn combination_display(combo: &KeyCombination, platform: Platform) -> String {
    match platform {
        Platform::MacOS => {
            let mut s = String::new();
            if combo.modifiers.ctrl {
                s.push('⌃');
            }
            if combo.modifiers.alt {
                s.push('⌥');
            }
            if combo.modifiers.shift {
                s.push('⇧');
            }
            if combo.modifiers.meta {
                s.push('⌘');
            }
            s.push_str(&key_glyph(&combo.key));
            s
        }
        Platform::Windows | Platform::Linux => {
            let mut parts: Vec<String> = Vec::new();
            if combo.modifiers.ctrl {
                parts.push("Ctrl".to_string());
            }
            if combo.modifiers.alt {
                parts.push("Alt".to_string());
            }
            if combo.modifiers.shift {
                parts.push("Shift".to_string());
            }
            if combo.modifiers.meta {
                parts.push(if platform == Platform::Windows { "Win" } else { "Meta" }.to_string());
            }
            parts.push(key_text(&combo.key));
            parts.join("+")
        }
    }
}

fn key_glyph(key: &str) -> String {
    match key {
        "enter" => "↵",
        "escape" => "⎋",
        "tab" => "⇥",
        "space" => "␣",
        "backspace" => "⌫",
        "delete" => "⌦",
        "up" => "↑",
        "down" => "↓",
        "left" => "←",
        "right" => "→",
        "pageup" => "⇞",
        "pagedown" => "⇟",
        k => return k.to_uppercase(),
    }
    .to_string()
}

fn key_text(key: &str) -> String {
    match key {
        "enter" => "Enter",
        "escape" => "Esc",
        "tab" => "Tab",
        "space" => "Space",
        "backspace" => "Backspace",
        "delete" => "Delete",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "home" => "Home",
        "end" => "End",
        "pageup" => "PageUp",
        "pagedown" => "PageDown",
        k => return k.to_uppercase(),
    }
    .to_string()
}
