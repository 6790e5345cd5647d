use std::collections::BTreeSet;

use ricecoder_hotkeys::*;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_duplicate_actions_sorted_and_deduplicated() {
    let mut keymap = Keymap::new();
    keymap.bind("a", "y").unwrap();
    keymap.bind("a", "x").unwrap();
    keymap.bind("a", "y").unwrap();

    let conflicts = ConflictDetector::detect(&keymap);
    let info = &conflicts["a"];
    assert_eq!(info.duplicates, vec!["x", "y"]);
    assert_eq!(info.kinds(), vec![ConflictKind::Duplicate]);
}

#[test]
fn test_prefix_relation_is_reciprocal() {
    let keymap = Keymap::from_pairs([("g g", "top"), ("g", "go")]);
    let conflicts = ConflictDetector::detect(&keymap);

    assert_eq!(conflicts["g"].prefix_of, set(&["g g"]));
    assert_eq!(conflicts["g g"].has_prefix, set(&["g"]));
    assert!(conflicts["g"].has_prefix.is_empty());
}

#[test]
fn test_placeholder_overlaps_literal_digit() {
    let keymap = Keymap::from_pairs([(r"\d j", "down"), ("5 j", "five"), (r"\d+ j", "many")]);
    let conflicts = ConflictDetector::detect(&keymap);

    assert_eq!(conflicts[r"\d j"].overlaps, set(&[r"\d+ j", "5 j"]));
    assert_eq!(conflicts["5 j"].overlaps, set(&[r"\d j", r"\d+ j"]));
}

#[test]
fn test_modified_digit_does_not_overlap_placeholder() {
    let keymap = Keymap::from_pairs([(r"\d", "digit"), ("ctrl+5", "tab5")]);
    assert!(ConflictDetector::detect(&keymap).is_empty());
}

#[test]
fn test_shorthand_overlaps_explicit_shift() {
    let keymap = Keymap::from_pairs([("G", "bottom"), ("shift+g", "end")]);
    let conflicts = ConflictDetector::detect(&keymap);
    assert_eq!(conflicts["G"].overlaps, set(&["shift+g"]));
    assert_eq!(conflicts["shift+g"].kinds(), vec![ConflictKind::PatternOverlap]);
}

#[test]
fn test_different_modifiers_do_not_conflict() {
    let keymap = Keymap::from_pairs([("ctrl+k", "a"), ("alt+k", "b"), ("k", "c")]);
    assert!(ConflictDetector::detect(&keymap).is_empty());
}

#[test]
fn test_prefix_through_placeholder() {
    let keymap = Keymap::from_pairs([(r"g \d", "jump"), ("g 1 x", "special")]);
    let conflicts = ConflictDetector::detect(&keymap);
    assert_eq!(conflicts[r"g \d"].prefix_of, set(&["g 1 x"]));
    assert_eq!(conflicts["g 1 x"].has_prefix, set(&[r"g \d"]));
}

#[test]
fn test_result_is_independent_of_declaration_order() {
    let pairs = [
        ("g g", "top"),
        ("g", "go"),
        (r"\d d", "del"),
        ("5 d", "del5"),
        ("a", "x"),
        ("a", "y"),
    ];
    let forward = ConflictDetector::detect(&Keymap::from_pairs(pairs));
    let backward = ConflictDetector::detect(&Keymap::from_pairs(pairs.iter().rev().copied()));
    assert_eq!(forward, backward);
}

#[test]
fn test_check_binding_before_commit() {
    let keymap = Keymap::from_pairs([("ctrl+k ctrl+c", "comment")]);
    let info = ConflictDetector::check_binding(&keymap, "ctrl+k", "palette").unwrap();
    assert_eq!(info.prefix_of, set(&["ctrl+k ctrl+c"]));
    assert!(keymap.get("ctrl+k").is_none());
}
