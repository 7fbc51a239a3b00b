//! Key bindings for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key action that can be performed in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    // Record navigation
    PrevRecord,
    NextRecord,
    PrevPage,
    NextPage,
    FirstRecord,
    LastRecord,
    Goto,

    // Field selection in the record editor
    PrevField,
    NextField,

    // Editing
    NewRecord,
    EditField,
    Save,
    Discard,
    Delete,

    // Grid
    ScrollUp,
    ScrollDown,

    // UI toggles
    ToggleHelp,
    ToggleTheme,

    // Application
    WriteFile,
    Quit,
    ForceQuit,

    // No action
    None,
}

impl KeyAction {
    /// Convert a key event to an action.
    pub fn from_key_event(event: KeyEvent) -> Self {
        match (event.code, event.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => KeyAction::ForceQuit,

            // Record navigation - vim style
            (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::NextRecord,
            (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::PrevRecord,
            (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::PrevField,
            (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::NextField,

            // Arrow keys
            (KeyCode::Down, _) => KeyAction::NextRecord,
            (KeyCode::Up, _) => KeyAction::PrevRecord,
            (KeyCode::Left, _) => KeyAction::PrevField,
            (KeyCode::Right, _) => KeyAction::NextField,
            (KeyCode::Tab, KeyModifiers::NONE) => KeyAction::NextField,
            (KeyCode::BackTab, _) => KeyAction::PrevField,

            // Jump
            (KeyCode::Home, _) => KeyAction::FirstRecord,
            (KeyCode::End, _) => KeyAction::LastRecord,
            (KeyCode::Char('g'), KeyModifiers::NONE) => KeyAction::FirstRecord,
            (KeyCode::Char('G'), KeyModifiers::SHIFT) => KeyAction::LastRecord,
            (KeyCode::Char(':'), KeyModifiers::NONE | KeyModifiers::SHIFT) => KeyAction::Goto,

            // Page navigation
            (KeyCode::PageUp, _) => KeyAction::PrevPage,
            (KeyCode::PageDown, _) => KeyAction::NextPage,
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => KeyAction::PrevPage,
            (KeyCode::Char('d'), KeyModifiers::CONTROL) => KeyAction::NextPage,

            // Scroll the grid without moving the cursor
            (KeyCode::Char('e'), KeyModifiers::CONTROL) => KeyAction::ScrollDown,
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => KeyAction::ScrollUp,

            // Editing
            (KeyCode::Char('n'), KeyModifiers::NONE) => KeyAction::NewRecord,
            (KeyCode::Char('e'), KeyModifiers::NONE) => KeyAction::EditField,
            (KeyCode::Enter, _) => KeyAction::EditField,
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => KeyAction::Save,
            (KeyCode::Esc, _) => KeyAction::Discard,
            (KeyCode::Char('d'), KeyModifiers::NONE) => KeyAction::Delete,
            (KeyCode::Delete, _) => KeyAction::Delete,

            // UI toggles
            (KeyCode::Char('?'), KeyModifiers::NONE | KeyModifiers::SHIFT) => KeyAction::ToggleHelp,
            (KeyCode::Char('t'), KeyModifiers::NONE) => KeyAction::ToggleTheme,

            (KeyCode::Char('W'), KeyModifiers::SHIFT) => KeyAction::WriteFile,

            _ => KeyAction::None,
        }
    }
}

/// A section of key bindings for the help display.
pub struct HelpSection {
    pub title: &'static str,
    pub bindings: Vec<KeyBinding>,
}

/// Key binding for display in help.
pub struct KeyBinding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Get all key bindings organized by section for help display.
pub fn get_help_sections() -> Vec<HelpSection> {
    vec![
        HelpSection {
            title: "Navigation",
            bindings: vec![
                KeyBinding { keys: "j/k ↑/↓", description: "Next/previous record" },
                KeyBinding { keys: "PgUp/PgDn", description: "Previous/next page" },
                KeyBinding { keys: "Home/End", description: "First/last record" },
                KeyBinding { keys: "g/G", description: "First/last record" },
                KeyBinding { keys: ":", description: "Go to record" },
                KeyBinding { keys: "Ctrl-e/y", description: "Scroll grid" },
            ],
        },
        HelpSection {
            title: "Editing",
            bindings: vec![
                KeyBinding { keys: "h/l Tab", description: "Select field" },
                KeyBinding { keys: "e/Enter", description: "Edit field" },
                KeyBinding { keys: "n", description: "New record" },
                KeyBinding { keys: "Ctrl-s", description: "Save record" },
                KeyBinding { keys: "Esc", description: "Discard edits" },
                KeyBinding { keys: "d/Del", description: "Delete record" },
            ],
        },
        HelpSection {
            title: "Application",
            bindings: vec![
                KeyBinding { keys: "W", description: "Write records to file" },
                KeyBinding { keys: "t", description: "Toggle dark/light theme" },
                KeyBinding { keys: "?", description: "Show this help" },
                KeyBinding { keys: "q", description: "Quit" },
            ],
        },
    ]
}

/// Accepted forms for the go-to prompt.
pub fn get_goto_help() -> Vec<(&'static str, &'static str)> {
    vec![
        ("12 / #12", "Record 12"),
        ("bof", "Before the first record"),
        ("eof", "After the last record"),
        ("new", "Compose a new record"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            KeyAction::NextRecord
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::PageUp, KeyModifiers::NONE)),
            KeyAction::PrevPage
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::End, KeyModifiers::NONE)),
            KeyAction::LastRecord
        );
    }

    #[test]
    fn test_editing_keys() {
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            KeyAction::Save
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Esc, KeyModifiers::NONE)),
            KeyAction::Discard
        );
        assert_eq!(
            KeyAction::from_key_event(key(KeyCode::Char('s'), KeyModifiers::NONE)),
            KeyAction::None
        );
    }
}
