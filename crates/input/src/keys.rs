//! Key mapping from terminal events to input bits and control actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::InputEvent;

/// Keys that drive the game rather than the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    /// Start a game, or toggle pause while one is running
    StartOrPause,
    TogglePause,
    Quit,
}

/// Map a key to the input bit it holds down.
///
/// | Key | Bit |
/// |-----|-----|
/// | Down | advance |
/// | Left | move-left |
/// | Right | move-right |
/// | `a` | rotate-left |
/// | `s`, Up | rotate-right |
pub fn key_event_bit(code: KeyCode) -> Option<InputEvent> {
    match code {
        KeyCode::Down => Some(InputEvent::ADVANCE),
        KeyCode::Left => Some(InputEvent::MOVE_LEFT),
        KeyCode::Right => Some(InputEvent::MOVE_RIGHT),
        KeyCode::Char('a') | KeyCode::Char('A') => Some(InputEvent::ROTATE_LEFT),
        KeyCode::Up | KeyCode::Char('s') | KeyCode::Char('S') => Some(InputEvent::ROTATE_RIGHT),
        _ => None,
    }
}

/// Map a key to a control action.
pub fn control_key(key: KeyEvent) -> Option<ControlKey> {
    if should_quit(key) {
        return Some(ControlKey::Quit);
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(ControlKey::StartOrPause),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(ControlKey::TogglePause),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
