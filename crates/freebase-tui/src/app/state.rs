//! Application state types and persisted settings.

use std::path::{Path, PathBuf};
use std::time::Instant;

use freebase_core::GridConfig;
use freebase_cursor::NavCommand;
use serde::{Deserialize, Serialize};

use crate::theme::ThemeVariant;

/// Application mode representing the current UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Normal,
    Help,
    /// Editing the selected field of the current record.
    Editing,
    /// Typing a target into the position field.
    Goto,
    /// Waiting for y/n before throwing away unsaved edits.
    ConfirmDiscard,
    Quit,
}

/// A cursor move that can be retried once the user agrees to discard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingMove {
    /// A navigation bar command.
    Nav(NavCommand),
    /// Text typed into the position field.
    Goto(String),
    /// A click on a grid row.
    Row(usize),
    /// Start a new record.
    NewRecord,
}

/// Severity of a status line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// A transient message shown in the status line.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub shown_at: Instant,
}

impl StatusMessage {
    /// Create a message stamped with the current time.
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        }
    }
}

/// User settings persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Color theme.
    pub theme: ThemeVariant,
    /// Ask before discarding unsaved edits.
    pub confirm_discard: bool,
    /// Width of every grid column, overriding the configured default.
    pub column_width: Option<u16>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: ThemeVariant::Dark,
            confirm_discard: true,
            column_width: None,
        }
    }
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("freebase").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file, or return defaults.
    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Save settings to disk.
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No config directory")
        })?;
        self.save_to(&path)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        std::fs::write(path, content)
    }

    /// Fold these settings into a grid configuration.
    pub fn apply(&self, config: &mut GridConfig) {
        config.confirm_discard = self.confirm_discard;
        if let Some(width) = self.column_width {
            config.default_column_width = width.max(config.min_column_width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = UserSettings {
            theme: ThemeVariant::Light,
            confirm_discard: false,
            column_width: Some(24),
        };
        settings.save_to(&path).unwrap();

        assert_eq!(UserSettings::load_from(&path), settings);
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(UserSettings::load_from(&missing), UserSettings::default());

        let partial = dir.path().join("partial.toml");
        std::fs::write(&partial, "theme = \"light\"\n").unwrap();
        let settings = UserSettings::load_from(&partial);
        assert_eq!(settings.theme, ThemeVariant::Light);
        assert!(settings.confirm_discard);
    }

    #[test]
    fn test_apply_respects_min_width() {
        let mut config = GridConfig::default();
        let settings = UserSettings {
            column_width: Some(1),
            confirm_discard: false,
            ..Default::default()
        };
        settings.apply(&mut config);
        assert_eq!(config.default_column_width, config.min_column_width);
        assert!(!config.confirm_discard);
    }
}
