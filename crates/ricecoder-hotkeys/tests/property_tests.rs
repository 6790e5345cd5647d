//! Property-based tests for pattern formatting, conflict detection and matching

use std::time::Instant;

use proptest::prelude::*;
use ricecoder_hotkeys::*;

/// Strategy for generating modifier flags
fn modifiers_strategy() -> impl Strategy<Value = Modifiers> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(ctrl, alt, shift, meta)| Modifiers {
            ctrl,
            alt,
            shift,
            meta,
        },
    )
}

/// Strategy for generating already-normalized key names
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (b'a'..=b'z').prop_map(|c| (c as char).to_string()),
        (b'0'..=b'9').prop_map(|c| (c as char).to_string()),
        prop::sample::select(vec![
            "enter", "escape", "tab", "space", "backspace", "delete", "up", "down", "left",
            "right", "home", "end", "pageup", "pagedown", "f5", "+", "#", "?", "/",
        ])
        .prop_map(str::to_string),
    ]
}

fn elem_strategy() -> impl Strategy<Value = SeqElem> {
    prop_oneof![
        6 => (key_strategy(), modifiers_strategy())
            .prop_map(|(key, modifiers)| SeqElem::Key(KeyCombination::new(key, modifiers))),
        1 => Just(SeqElem::Digit),
        1 => Just(SeqElem::Digits),
    ]
}

fn seq_strategy() -> impl Strategy<Value = KeySeq> {
    prop::collection::vec(elem_strategy(), 1..5).prop_map(KeySeq::new)
}

/// Patterns over a small alphabet so conflicts actually occur
fn small_pattern_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!["g", "h", "1", "ctrl+g", r"\d", r"\d+"]),
        1..4,
    )
    .prop_map(|tokens| tokens.join(" "))
}

proptest! {
    #[test]
    fn prop_format_then_parse_round_trips(seq in seq_strategy()) {
        for platform in [Platform::MacOS, Platform::Windows, Platform::Linux] {
            let formatted = format_key_seq(&seq, platform);
            prop_assert_eq!(parse_key_seq(&formatted.id), seq.clone());
        }
    }

    #[test]
    fn prop_canonical_id_is_stable(seq in seq_strategy()) {
        let id = seq.id();
        prop_assert_eq!(parse_key_seq(&id).id(), id);
    }

    #[test]
    fn prop_detection_ignores_declaration_order(
        pairs in prop::collection::vec((small_pattern_strategy(), "[a-c]"), 1..8)
    ) {
        let forward = Keymap::from_pairs(pairs.iter().map(|(p, a)| (p.as_str(), a.clone())));
        let backward = Keymap::from_pairs(pairs.iter().rev().map(|(p, a)| (p.as_str(), a.clone())));
        prop_assert_eq!(ConflictDetector::detect(&forward), ConflictDetector::detect(&backward));
    }

    #[test]
    fn prop_prefix_relations_are_reciprocal(
        pairs in prop::collection::vec((small_pattern_strategy(), "[a-c]"), 1..8)
    ) {
        let keymap = Keymap::from_pairs(pairs.iter().map(|(p, a)| (p.as_str(), a.clone())));
        let conflicts = ConflictDetector::detect(&keymap);
        for (pattern, info) in &conflicts {
            for longer in &info.prefix_of {
                prop_assert!(conflicts[longer].has_prefix.contains(pattern));
            }
            for other in &info.overlaps {
                prop_assert!(conflicts[other].overlaps.contains(pattern));
            }
        }
    }

    #[test]
    fn prop_sole_binding_executes_when_typed(
        keys in prop::collection::vec((b'a'..=b'z').prop_map(|c| (c as char).to_string()), 1..5)
    ) {
        let pattern = keys.join(" ");
        let mut dispatcher = Dispatcher::new(
            Keymap::from_pairs([(pattern.as_str(), "action")]),
            DispatchOptions::default(),
        );
        let now = Instant::now();
        let mut last = Dispatch::Ignored;
        for key in &keys {
            last = dispatcher.handle_key(&KeyEvent::down(key, Modifiers::NONE), now);
        }
        prop_assert!(last.is_executed());
        prop_assert!(!dispatcher.is_awaiting());
        prop_assert_eq!(dispatcher.next_deadline(), None);
    }

    #[test]
    fn prop_digit_run_captures_typed_number(n in 0u64..1_000_000) {
        let mut dispatcher = Dispatcher::new(
            Keymap::from_pairs([(r"\d+ g", "goto")]),
            DispatchOptions::default(),
        );
        let now = Instant::now();
        for c in n.to_string().chars() {
            dispatcher.handle_key(&KeyEvent::down(c.to_string(), Modifiers::NONE), now);
        }
        let out = dispatcher.handle_key(&KeyEvent::down("g", Modifiers::NONE), now);
        match out {
            Dispatch::Executed { captures, .. } => prop_assert_eq!(captures, vec![n]),
            other => prop_assert!(false, "expected execution, got {:?}", other),
        }
    }
}
