//! Conversion from crossterm key events

use crossterm::event::{
    KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind as CrosstermKind, KeyModifiers,
    ModifierKeyCode,
};

use crate::models::{is_shifted_symbol, KeyEvent, KeyEventKind, Modifiers};

/// Convert a crossterm key event, or `None` for keys the engine has no name for
pub fn from_crossterm(event: CrosstermKeyEvent) -> Option<KeyEvent> {
    let mut modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
        meta: event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };

    let key = match event.code {
        KeyCode::Char(c) => {
            if c.is_ascii_uppercase() {
                modifiers.shift = true;
            }
            let key = c.to_lowercase().to_string();
            if is_shifted_symbol(&key) {
                modifiers.shift = false;
            }
            key
        }
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "escape".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => {
            modifiers.shift = true;
            "tab".to_string()
        }
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::F(n) => format!("f{}", n),
        KeyCode::Modifier(code) => modifier_name(code)?.to_string(),
        _ => return None,
    };

    let kind = match event.kind {
        CrosstermKind::Release => KeyEventKind::Up,
        CrosstermKind::Press | CrosstermKind::Repeat => KeyEventKind::Down,
    };

    let mut converted = KeyEvent::down(key, modifiers);
    converted.kind = kind;
    Some(converted)
}

fn modifier_name(code: ModifierKeyCode) -> Option<&'static str> {
    match code {
        ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Some("ctrl"),
        ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => Some("alt"),
        ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Some("shift"),
        ModifierKeyCode::LeftSuper
        | ModifierKeyCode::RightSuper
        | ModifierKeyCode::LeftMeta
        | ModifierKeyCode::RightMeta => Some("meta"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    #[test]
    fn test_simple_key() {
        let event = CrosstermKeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        let converted = from_crossterm(event).unwrap();
        assert_eq!(converted.key, "a");
        assert!(converted.modifiers.is_empty());
        assert_eq!(converted.kind, KeyEventKind::Down);
    }

    #[test]
    fn test_uppercase_char_implies_shift() {
        let event = CrosstermKeyEvent::new(KeyCode::Char('G'), KeyModifiers::NONE);
        let converted = from_crossterm(event).unwrap();
        assert_eq!(converted.combination().to_string(), "shift+g");
    }

    #[test]
    fn test_shifted_symbol_drops_shift() {
        let event = CrosstermKeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT);
        assert_eq!(from_crossterm(event).unwrap().combination().to_string(), "?");
    }

    #[test]
    fn test_ctrl_and_release() {
        let event = CrosstermKeyEvent {
            code: KeyCode::Char('s'),
            modifiers: KeyModifiers::CONTROL,
            kind: CrosstermKind::Release,
            state: KeyEventState::NONE,
        };
        let converted = from_crossterm(event).unwrap();
        assert_eq!(converted.combination().to_string(), "ctrl+s");
        assert_eq!(converted.kind, KeyEventKind::Up);
    }

    #[test]
    fn test_space_and_function_keys() {
        let space = CrosstermKeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(from_crossterm(space).unwrap().key, "space");
        let f5 = CrosstermKeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(from_crossterm(f5).unwrap().key, "f5");
        let null = CrosstermKeyEvent::new(KeyCode::Null, KeyModifiers::NONE);
        assert!(from_crossterm(null).is_none());
    }
}
