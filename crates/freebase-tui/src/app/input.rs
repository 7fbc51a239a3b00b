//! Single-line text input used by the field editor and the go-to prompt.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// State of a text prompt.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// The current input buffer.
    buffer: String,
    /// Cursor position, in characters.
    cursor: usize,
    /// Text the prompt opened with.
    original: Option<String>,
    /// Field being edited, if any.
    field: Option<String>,
}

impl InputState {
    /// Create an empty prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prompt editing a field's current text.
    pub fn for_field(field: impl Into<String>, value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.chars().count(),
            original: Some(value.to_string()),
            field: Some(field.into()),
        }
    }

    /// Get the current buffer contents.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Get the cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Name of the field being edited.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Check if the buffer differs from the text the prompt opened with.
    pub fn has_changed(&self) -> bool {
        self.original.as_deref().unwrap_or_default() != self.buffer
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(chars)
            .map_or(self.buffer.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputResult::Submit(self.buffer.clone()),
            (KeyCode::Esc, _) => InputResult::Cancel,

            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                InputResult::Continue
            }
            (KeyCode::Delete, _) => {
                if self.cursor < self.char_len() {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                InputResult::Continue
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                InputResult::Continue
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                InputResult::Continue
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                InputResult::Continue
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.char_len();
                InputResult::Continue
            }

            // Ctrl-U clears the line
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.cursor = 0;
                InputResult::Continue
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                InputResult::Continue
            }

            _ => InputResult::Continue,
        }
    }
}

/// Result of handling a key in a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Keep accepting input.
    Continue,
    /// User closed the prompt.
    Cancel,
    /// User submitted this text.
    Submit(String),
}
