//! Pattern parsing and keymap document parsers for JSON and YAML formats

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::KeymapError;
use crate::models::{KeyCombination, KeySeq, Modifiers, SeqElem};

/// Parse a whitespace separated binding string into a pattern.
///
/// Never fails: a token that cannot be read as `mod+...+key` becomes a literal
/// key with no modifiers.
pub fn parse_key_seq(pattern: &str) -> KeySeq {
    KeySeq(pattern.split_whitespace().map(parse_token).collect())
}

fn parse_token(token: &str) -> SeqElem {
    // `\D` would otherwise lowercase into a literal key spelled like a placeholder
    match token.to_ascii_lowercase().as_str() {
        r"\d" => return SeqElem::Digit,
        r"\d+" => return SeqElem::Digits,
        "+" => return SeqElem::Key(KeyCombination::bare("+")),
        _ => {}
    }

    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_uppercase() {
            return SeqElem::Key(KeyCombination::new(
                c.to_ascii_lowercase().to_string(),
                Modifiers::shift(),
            ));
        }
    }

    // `ctrl++` binds the plus key itself
    let (head, key) = match token.strip_suffix("++") {
        Some(head) => (head, "+"),
        None => match token.rsplit_once('+') {
            Some((head, key)) => (head, key),
            None => return SeqElem::Key(KeyCombination::bare(token)),
        },
    };

    if key.is_empty() {
        return literal(token);
    }

    let mut modifiers = Modifiers::NONE;
    for segment in head.split('+') {
        if !modifiers.set_alias(segment) {
            return literal(token);
        }
    }

    SeqElem::Key(KeyCombination::new(key, modifiers))
}

fn literal(token: &str) -> SeqElem {
    tracing::debug!(token, "unrecognized hotkey token, treating as literal key");
    SeqElem::Key(KeyCombination {
        key: token.to_lowercase(),
        modifiers: Modifiers::NONE,
    })
}

/// A single binding entry in a keymap document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeybindEntry {
    pub action_id: String,
    pub key: String,
    #[serde(default)]
    pub description: String,
}

impl KeybindEntry {
    pub fn new(action_id: impl Into<String>, key: impl Into<String>) -> Self {
        KeybindEntry {
            action_id: action_id.into(),
            key: key.into(),
            description: String::new(),
        }
    }
}

/// Trait for parsing keymap documents
pub trait KeymapParser: Send + Sync {
    /// Parse a keymap document into its binding entries, in declaration order
    fn parse(&self, content: &str) -> Result<Vec<KeybindEntry>, KeymapError>;
}

/// Registry for keymap parsers keyed by format name
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn KeymapParser>>,
}

impl ParserRegistry {
    /// Create a new parser registry with the JSON and YAML parsers
    pub fn new() -> Self {
        let mut parsers: HashMap<String, Arc<dyn KeymapParser>> = HashMap::new();
        parsers.insert("json".to_string(), Arc::new(JsonKeymapParser));
        parsers.insert("yaml".to_string(), Arc::new(YamlKeymapParser));
        parsers.insert("yml".to_string(), Arc::new(YamlKeymapParser));

        ParserRegistry { parsers }
    }

    /// Register a custom parser for a format
    pub fn register(&mut self, format: impl Into<String>, parser: Arc<dyn KeymapParser>) {
        self.parsers.insert(format.into(), parser);
    }

    pub fn get_parser(&self, format: &str) -> Option<Arc<dyn KeymapParser>> {
        self.parsers.get(format).cloned()
    }

    /// Parse content with an explicit format
    pub fn parse(&self, content: &str, format: &str) -> Result<Vec<KeybindEntry>, KeymapError> {
        let parser = self
            .get_parser(format)
            .ok_or_else(|| KeymapError::UnknownFormat(format.to_string()))?;
        parser.parse(content)
    }

    /// Try JSON first, then fall back to YAML
    pub fn parse_auto(&self, content: &str) -> Result<Vec<KeybindEntry>, KeymapError> {
        match self.parse(content, "json") {
            Ok(entries) => Ok(entries),
            Err(_) => self.parse(content, "yaml"),
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct KeymapDocument {
    keybinds: Option<Vec<serde_json::Value>>,
}

fn validate_entries(values: Vec<serde_json::Value>) -> Result<Vec<KeybindEntry>, KeymapError> {
    let mut entries = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        let entry: KeybindEntry =
            serde_json::from_value(value).map_err(|e| KeymapError::EntryError {
                entry: idx + 1,
                message: e.to_string(),
            })?;

        if entry.action_id.trim().is_empty() {
            return Err(KeymapError::EntryError {
                entry: idx + 1,
                message: "Missing action_id".to_string(),
            });
        }
        if entry.key.trim().is_empty() {
            return Err(KeymapError::EntryError {
                entry: idx + 1,
                message: "Missing key".to_string(),
            });
        }

        entries.push(entry);
    }
    Ok(entries)
}

/// JSON keymap parser
pub struct JsonKeymapParser;

impl KeymapParser for JsonKeymapParser {
    fn parse(&self, content: &str) -> Result<Vec<KeybindEntry>, KeymapError> {
        let doc: KeymapDocument = serde_json::from_str(content)
            .map_err(|e| KeymapError::InvalidDocument(e.to_string()))?;
        let values = doc
            .keybinds
            .ok_or_else(|| KeymapError::MissingField("keybinds".to_string()))?;
        validate_entries(values)
    }
}

/// YAML keymap parser
pub struct YamlKeymapParser;

impl KeymapParser for YamlKeymapParser {
    fn parse(&self, content: &str) -> Result<Vec<KeybindEntry>, KeymapError> {
        let doc: KeymapDocument = serde_yaml::from_str(content)
            .map_err(|e| KeymapError::InvalidDocument(e.to_string()))?;
        let values = doc
            .keybinds
            .ok_or_else(|| KeymapError::MissingField("keybinds".to_string()))?;
        validate_entries(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str, modifiers: Modifiers) -> SeqElem {
        SeqElem::Key(KeyCombination::new(k, modifiers))
    }

    #[test]
    fn test_parse_modified_key() {
        let seq = parse_key_seq("Ctrl+Shift+K");
        let expected = Modifiers {
            ctrl: true,
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(seq.elems(), &[key("k", expected)]);
    }

    #[test]
    fn test_parse_modifier_aliases() {
        let seq = parse_key_seq("cmd+a option+b control+c");
        assert_eq!(
            seq.elems(),
            &[
                key("a", Modifiers::meta()),
                key("b", Modifiers::alt()),
                key("c", Modifiers::ctrl()),
            ]
        );
    }

    #[test]
    fn test_parse_placeholders() {
        let seq = parse_key_seq(r"g \d \d+ x");
        assert_eq!(
            seq.elems(),
            &[
                key("g", Modifiers::NONE),
                SeqElem::Digit,
                SeqElem::Digits,
                key("x", Modifiers::NONE),
            ]
        );
    }

    #[test]
    fn test_uppercase_shorthand() {
        assert_eq!(parse_key_seq("G").elems(), &[key("g", Modifiers::shift())]);
    }

    #[test]
    fn test_plus_key() {
        assert_eq!(parse_key_seq("+").elems(), &[key("+", Modifiers::NONE)]);
        assert_eq!(parse_key_seq("ctrl++").elems(), &[key("+", Modifiers::ctrl())]);
    }

    #[test]
    fn test_unknown_modifier_degrades_to_literal() {
        let seq = parse_key_seq("hyper+x");
        assert_eq!(
            seq.elems(),
            &[SeqElem::Key(KeyCombination {
                key: "hyper+x".to_string(),
                modifiers: Modifiers::NONE,
            })]
        );
    }

    #[test]
    fn test_special_key_names() {
        assert_eq!(parse_key_seq("ArrowDown").elems(), &[key("down", Modifiers::NONE)]);
        assert_eq!(parse_key_seq("alt+Return").elems(), &[key("enter", Modifiers::alt())]);
    }

    #[test]
    fn test_empty_pattern() {
        assert!(parse_key_seq("   ").is_empty());
    }

    #[test]
    fn test_json_parser() {
        let json = r#"{
            "version": "1.0",
            "keybinds": [
                { "action_id": "nav.top", "key": "g g", "description": "Go to top" },
                { "action_id": "nav.line", "key": "g \\d+ enter" }
            ]
        }"#;

        let entries = JsonKeymapParser.parse(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action_id, "nav.top");
        assert_eq!(entries[1].key, r"g \d+ enter");
    }

    #[test]
    fn test_json_parser_missing_keybinds() {
        let err = JsonKeymapParser.parse(r#"{"version": "1.0"}"#).unwrap_err();
        assert!(matches!(err, KeymapError::MissingField(_)));
    }

    #[test]
    fn test_json_parser_empty_key() {
        let json = r#"{"keybinds": [{ "action_id": "a", "key": "  " }]}"#;
        let err = JsonKeymapParser.parse(json).unwrap_err();
        assert!(matches!(err, KeymapError::EntryError { entry: 1, .. }));
    }

    #[test]
    fn test_yaml_parser() {
        let yaml = "keybinds:\n  - action_id: editor.save\n    key: ctrl+s\n  - action_id: nav.top\n    key: g g\n";
        let entries = YamlKeymapParser.parse(yaml).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].key, "g g");
    }

    #[test]
    fn test_registry_auto_detects_yaml() {
        let registry = ParserRegistry::new();
        let yaml = "keybinds:\n  - action_id: editor.save\n    key: ctrl+s\n";
        assert_eq!(registry.parse_auto(yaml).unwrap().len(), 1);
        assert!(matches!(
            registry.parse("", "toml"),
            Err(KeymapError::UnknownFormat(_))
        ));
    }
}
