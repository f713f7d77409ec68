//! Key routing for the dashboard.
//!
//! Keys are modeled independently of the terminal backend; the runtime maps
//! backend events to [`Key`] before they reach the reducer.

#![allow(missing_docs)]

use super::model::Focus;

/// Backend-neutral key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Character typed with Control held.
    Ctrl(char),
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Tab,
    BackTab,
    Esc,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    ToggleFocus,
    /// Move the function list cursor (±1).
    MoveCursor(isize),
    /// Scroll the log panel by one line step in the given direction.
    ScrollLine(isize),
    /// Scroll the log panel by one page step in the given direction.
    ScrollPage(isize),
    /// Jump to the end of the log buffer and follow new lines.
    FollowTail,
    /// Jump to the first log line.
    ScrollTop,
    /// Load metadata and logs for the function under the list cursor.
    Activate,
}

/// Resolve a key press in the given focus context.
#[must_use]
pub fn resolve_key(key: Key, focus: Focus) -> Option<InputAction> {
    match key {
        Key::Char('q') | Key::Esc | Key::Ctrl('c') => return Some(InputAction::Quit),
        Key::Tab | Key::BackTab => return Some(InputAction::ToggleFocus),
        Key::Enter => return Some(InputAction::Activate),
        _ => {}
    }

    match focus {
        Focus::Entities => match key {
            Key::Up | Key::Char('k') => Some(InputAction::MoveCursor(-1)),
            Key::Down | Key::Char('j') => Some(InputAction::MoveCursor(1)),
            _ => None,
        },
        Focus::Logs => match key {
            Key::Up | Key::Char('k') => Some(InputAction::ScrollLine(-1)),
            Key::Down | Key::Char('j') => Some(InputAction::ScrollLine(1)),
            Key::PageUp | Key::Ctrl('b') => Some(InputAction::ScrollPage(-1)),
            Key::PageDown | Key::Ctrl('f') => Some(InputAction::ScrollPage(1)),
            Key::End | Key::Char('G') => Some(InputAction::FollowTail),
            Key::Home | Key::Char('g') => Some(InputAction::ScrollTop),
            _ => None,
        },
    }
}
