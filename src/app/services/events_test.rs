use crossterm::event::{KeyEvent, KeyModifiers};

use super::*;

fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
    CrosstermEvent::Key(KeyEvent::new(code, modifiers))
}

#[test]
fn test_map_enter() {
    assert!(matches!(
        map_crossterm(key(KeyCode::Enter, KeyModifiers::NONE)),
        Some(Event::KeyboardEnter)
    ));
    assert!(matches!(
        map_crossterm(key(KeyCode::Enter, KeyModifiers::ALT)),
        Some(Event::KeyboardNewLine)
    ));
    assert!(matches!(
        map_crossterm(key(KeyCode::Enter, KeyModifiers::SHIFT)),
        Some(Event::KeyboardNewLine)
    ));
}

#[test]
fn test_map_ctrl_shortcuts() {
    let cases = [
        ('n', "KeyboardCtrlN"),
        ('r', "KeyboardCtrlR"),
        ('p', "KeyboardCtrlP"),
        ('t', "KeyboardCtrlT"),
        ('s', "KeyboardCtrlS"),
        ('o', "KeyboardCtrlO"),
        ('k', "KeyboardCtrlK"),
        ('c', "KeyboardCtrlC"),
        ('q', "Quit"),
    ];
    for (c, expected) in cases {
        let event = map_crossterm(key(KeyCode::Char(c), KeyModifiers::CONTROL))
            .expect("shortcut should be mapped");
        assert_eq!(format!("{:?}", event), expected, "ctrl+{}", c);
    }

    // Unknown shortcuts are forwarded to the text area
    assert!(matches!(
        map_crossterm(key(KeyCode::Char('a'), KeyModifiers::CONTROL)),
        Some(Event::KeyboardCharInput(_))
    ));
}

#[test]
fn test_map_navigation() {
    assert!(matches!(
        map_crossterm(key(KeyCode::Tab, KeyModifiers::NONE)),
        Some(Event::KeyboardTab)
    ));
    assert!(matches!(
        map_crossterm(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
        Some(Event::KeyboardBackTab)
    ));
    assert!(matches!(
        map_crossterm(key(KeyCode::PageUp, KeyModifiers::NONE)),
        Some(Event::UiScrollPageUp)
    ));
    assert!(matches!(
        map_crossterm(key(KeyCode::Down, KeyModifiers::NONE)),
        Some(Event::UiScrollDown)
    ));
    assert!(matches!(
        map_crossterm(CrosstermEvent::Paste("hello".to_string())),
        Some(Event::KeyboardPaste(text)) if text == "hello"
    ));
}

#[test]
fn test_map_char_input() {
    match map_crossterm(key(KeyCode::Char('x'), KeyModifiers::NONE)) {
        Some(Event::KeyboardCharInput(input)) => assert_eq!(input.key, Key::Char('x')),
        other => panic!("unexpected event {:?}", other),
    }
    assert!(map_crossterm(CrosstermEvent::FocusGained).is_none());
}
