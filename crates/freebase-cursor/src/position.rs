//! Cursor positions.

use std::fmt;

/// Where a cursor currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    /// Before the first record.
    #[default]
    Bof,
    /// After the last record.
    Eof,
    /// An unsaved record being composed.
    New,
    /// A stored record, by row index.
    Row(usize),
}

impl Position {
    /// Row index, if positioned on a stored record.
    pub fn row(self) -> Option<usize> {
        match self {
            Self::Row(index) => Some(index),
            _ => None,
        }
    }

    /// Whether field access is allowed here.
    pub fn has_record(self) -> bool {
        matches!(self, Self::Row(_) | Self::New)
    }

    /// Parse user input: `bof`, `eof`, `new` or a 1-based row number.
    pub fn parse_display(text: &str) -> Option<Self> {
        let text = text.trim().trim_start_matches('#');
        match text.to_ascii_lowercase().as_str() {
            "bof" => Some(Self::Bof),
            "eof" => Some(Self::Eof),
            "new" => Some(Self::New),
            other => other
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .map(Self::Row),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bof => f.write_str("BOF"),
            Self::Eof => f.write_str("EOF"),
            Self::New => f.write_str("NEW"),
            Self::Row(index) => write!(f, "#{}", index + 1),
        }
    }
}
