//! Terminal user interface for freebase.
//!
//! This crate puts a record grid, a record editor and a navigation bar on
//! one screen, all bound to the same datasource, built with ratatui.
//!
//! # Overview
//!
//! - **Grid** - scrollable table of every row with mouse selection
//! - **Record editor** - the current record, one field per line
//! - **Navigation bar** - first/prev/next/last/page buttons and the position
//!
//! Leaving a record with unsaved edits asks for confirmation first.
//!
//! # Usage
//!
//! ```rust,no_run
//! use freebase_core::MemoryDatasource;
//! use freebase_tui::TuiConfig;
//!
//! let records = MemoryDatasource::load_json("people.json").unwrap();
//! freebase_tui::run(records, TuiConfig::new().with_title("people.json")).unwrap();
//! ```
//!
//! # Keyboard Navigation
//!
//! - `j`/`k` - Next/previous record
//! - `h`/`l` - Previous/next field
//! - `e` - Edit field
//! - `n` - New record
//! - `Ctrl-s` - Save record
//! - `d` - Delete record
//! - `:` - Go to record
//! - `?` - Help
//! - `q` - Quit

use std::path::PathBuf;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use freebase_core::{GridConfig, MemoryDatasource};

pub mod app;
mod event;
mod theme;
mod ui;

pub use app::state::UserSettings;
pub use app::{App, AppResult};
pub use theme::{Theme, ThemeVariant};

/// Startup options for the TUI.
#[derive(Debug, Clone, Default)]
pub struct TuiConfig {
    /// Shown in the header, usually the file name.
    pub title: String,
    /// File that `W` writes the records back to.
    pub path: Option<PathBuf>,
    pub grid: GridConfig,
    pub settings: UserSettings,
}

impl TuiConfig {
    /// Defaults with settings loaded from the user config directory.
    pub fn new() -> Self {
        Self {
            settings: UserSettings::load(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_settings(mut self, settings: UserSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Run the TUI application.
pub fn run(records: MemoryDatasource, config: TuiConfig) -> AppResult<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let terminal = ratatui::init();
    let result = match execute!(std::io::stdout(), EnableMouseCapture) {
        Ok(()) => rt.block_on(App::new(records, config).run(terminal)),
        Err(err) => Err(err.into()),
    };

    let released = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result?;
    released?;
    Ok(())
}
