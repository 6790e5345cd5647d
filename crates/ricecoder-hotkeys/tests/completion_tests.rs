use ricecoder_hotkeys::*;

fn keys(ids: &str) -> Vec<KeyCombination> {
    parse_key_seq(ids)
        .elems()
        .iter()
        .filter_map(|elem| match elem {
            SeqElem::Key(combo) => Some(combo.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_complete_first_then_continuations() {
    let keymap = Keymap::from_pairs([
        ("g h", "home"),
        ("g", "go"),
        ("g g", "top"),
        ("x", "cut"),
    ]);
    let result = CompletionResolver::resolve(&keys("g"), &keymap, Platform::Linux);
    let patterns: Vec<&str> = result.iter().map(Completion::pattern).collect();
    assert_eq!(patterns, vec!["g", "g g", "g h"]);
    assert!(result[0].is_complete());
    assert!(!result[1].is_complete());
}

#[test]
fn test_remaining_suffix_is_formatted() {
    let keymap = Keymap::from_pairs([("ctrl+k meta+s", "save_all"), (r"g \d+ j", "down")]);

    let result = CompletionResolver::resolve(&keys("ctrl+k"), &keymap, Platform::MacOS);
    match &result[..] {
        [Completion::Continuation { remaining, actions, .. }] => {
            assert_eq!(remaining.display, "⌘S");
            assert_eq!(remaining.id, "meta+s");
            assert_eq!(actions, &vec!["save_all".to_string()]);
        }
        other => panic!("unexpected completions: {:?}", other),
    }

    let result = CompletionResolver::resolve(&keys("g"), &keymap, Platform::Linux);
    match &result[..] {
        [Completion::Continuation { remaining, .. }] => {
            assert_eq!(remaining.display, "⟨##⟩ J");
            assert_eq!(remaining.id, r"\d+ j");
        }
        other => panic!("unexpected completions: {:?}", other),
    }
}

#[test]
fn test_digit_runs_complete_pattern() {
    let keymap = Keymap::from_pairs([(r"\d+ d d", "delete"), (r"\d d", "single")]);
    let result = CompletionResolver::resolve(&keys("1 2 d d"), &keymap, Platform::Linux);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].pattern(), r"\d+ d d");
    assert!(result[0].is_complete());
}

#[test]
fn test_single_digit_does_not_take_two() {
    let keymap = Keymap::from_pairs([(r"\d d", "single")]);
    assert!(CompletionResolver::resolve(&keys("1 2"), &keymap, Platform::Linux).is_empty());
}

#[test]
fn test_modified_digit_is_not_a_placeholder_match() {
    let keymap = Keymap::from_pairs([(r"\d x", "n")]);
    assert!(CompletionResolver::resolve(&keys("ctrl+1"), &keymap, Platform::Linux).is_empty());
}

#[test]
fn test_resolve_enabled_filters_actions() {
    let keymap = Keymap::from_pairs([("g g", "top"), ("g h", "home"), ("g h", "help")]);
    let registry: StaticActionRegistry = [
        ActionInfo::new("top", "Go to top"),
        ActionInfo::new("home", "Home").disabled(),
        ActionInfo::new("help", "Help"),
    ]
    .into_iter()
    .collect();

    let result = CompletionResolver::resolve_enabled(&keys("g"), &keymap, Platform::Linux, &registry);
    assert_eq!(result.len(), 2);
    assert_eq!(result[1].actions(), &["help".to_string()]);

    let mut registry = registry;
    registry.set_enabled("top", false);
    registry.set_enabled("help", false);
    assert!(
        CompletionResolver::resolve_enabled(&keys("g"), &keymap, Platform::Linux, &registry)
            .is_empty()
    );
}

#[test]
fn test_completion_serializes_with_kind_tag() {
    let keymap = Keymap::from_pairs([("g", "go")]);
    let result = CompletionResolver::resolve(&keys("g"), &keymap, Platform::Linux);
    let json = serde_json::to_value(&result[0]).unwrap();
    assert_eq!(json["kind"], "complete");
    assert_eq!(json["pattern"], "g");
}
