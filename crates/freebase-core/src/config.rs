//! Grid and navigation configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration shared by the grid viewport and the navigation bar.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct GridConfig {
    /// Rows moved by page commands (None = the fully visible row count).
    #[builder(default)]
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Display lines occupied by one data row.
    #[builder(default = "1")]
    #[serde(default = "default_row_height")]
    pub row_height: usize,

    /// Width of a column without an explicit width.
    #[builder(default = "16")]
    #[serde(default = "default_column_width")]
    pub default_column_width: u16,

    /// Narrowest a column may be rendered.
    #[builder(default = "4")]
    #[serde(default = "default_min_column_width")]
    pub min_column_width: u16,

    /// Ask before discarding edits to a dirty record.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub confirm_discard: bool,
}

fn default_row_height() -> usize {
    1
}

fn default_column_width() -> u16 {
    16
}

fn default_min_column_width() -> u16 {
    4
}

fn default_true() -> bool {
    true
}

impl GridConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.row_height == Some(0) {
            return Err("Row height must be at least 1".to_string());
        }
        if self.page_size == Some(Some(0)) {
            return Err("Page size must be at least 1".to_string());
        }
        let min = self.min_column_width.unwrap_or_else(default_min_column_width);
        let default = self.default_column_width.unwrap_or_else(default_column_width);
        if min > default {
            return Err(format!(
                "Minimum column width ({min}) exceeds default column width ({default})"
            ));
        }
        Ok(())
    }
}

impl GridConfig {
    /// Create a new grid config builder.
    pub fn builder() -> GridConfigBuilder {
        GridConfigBuilder::default()
    }

    /// Page size to use given the viewport's fully visible row count.
    pub fn effective_page_size(&self, fully_visible_rows: usize) -> usize {
        self.page_size.unwrap_or(fully_visible_rows).max(1)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: None,
            row_height: default_row_height(),
            default_column_width: default_column_width(),
            min_column_width: default_min_column_width(),
            confirm_discard: true,
        }
    }
}
