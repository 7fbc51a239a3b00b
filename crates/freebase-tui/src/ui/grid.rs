//! Spreadsheet grid widget.

use freebase_core::{Column, Record, Value};
use freebase_grid::GridViewport;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;
use crate::ui::GridGeometry;

/// Renders the rows currently inside the viewport.
pub struct GridView<'a> {
    theme: &'a Theme,
    geometry: GridGeometry,
    columns: &'a [Column],
    /// Visible rows as `(data index, record)`.
    rows: &'a [(usize, Record)],
    viewport: &'a GridViewport,
    cursor_row: Option<usize>,
    /// Scratch values of the cursor row, shown in place of the stored ones.
    cursor_values: Option<&'a Record>,
    dirty_fields: &'a [String],
}

impl<'a> GridView<'a> {
    pub fn new(
        theme: &'a Theme,
        geometry: GridGeometry,
        columns: &'a [Column],
        rows: &'a [(usize, Record)],
        viewport: &'a GridViewport,
    ) -> Self {
        Self {
            theme,
            geometry,
            columns,
            rows,
            viewport,
            cursor_row: None,
            cursor_values: None,
            dirty_fields: &[],
        }
    }

    /// Mark the row the cursor is on and overlay its unsaved values.
    pub fn cursor(mut self, row: Option<usize>, values: &'a Record, dirty: &'a [String]) -> Self {
        self.cursor_row = row;
        self.cursor_values = Some(values);
        self.dirty_fields = dirty;
        self
    }

    fn render_header(&self, buf: &mut Buffer) {
        let geo = &self.geometry;
        let corner = Rect::new(geo.area.x, geo.area.y, geo.gutter.min(geo.area.width), 1);
        buf.set_style(corner, self.theme.row_head);

        for col in geo.first_column..geo.first_column + geo.visible_columns() {
            let Some(rect) = geo.cell_rect(col, geo.first_row) else {
                continue;
            };
            let style = if self
                .viewport
                .column_highlight()
                .is_some_and(|band| band.contains(col))
            {
                self.theme.column_head.patch(self.theme.selection)
            } else {
                self.theme.column_head
            };
            let caption = self
                .columns
                .get(col)
                .map_or("", |column| column.caption.as_str());
            let header = Rect::new(rect.x, geo.area.y, rect.width, 1);
            buf.set_style(header, style);
            let caption = fit(caption, header.width.saturating_sub(1));
            buf.set_string(header.x, header.y, caption, style);
        }
    }

    fn render_row(&self, index: usize, record: &Record, buf: &mut Buffer) {
        let geo = &self.geometry;
        let is_cursor = self.cursor_row == Some(index);
        let values = match (is_cursor, self.cursor_values) {
            (true, Some(values)) => values,
            _ => record,
        };

        let mut row_top = None;
        for col in geo.first_column..geo.first_column + geo.visible_columns() {
            let Some(rect) = geo.cell_rect(col, index) else {
                continue;
            };
            row_top.get_or_insert((rect.y, rect.height));
            let Some(column) = self.columns.get(col) else {
                continue;
            };

            let value = values.get(&column.name);
            let dirty = is_cursor && self.dirty_fields.contains(&column.name);
            let style = self.cell_style(col, index, is_cursor, dirty, value);

            buf.set_style(rect, style);
            let text = value.map(Value::to_string).unwrap_or_default();
            let text = fit(&single_line(&text), rect.width.saturating_sub(1));
            buf.set_string(rect.x, rect.y, text, style);
        }

        if let Some((y, height)) = row_top {
            let gutter = Rect::new(geo.area.x, y, geo.gutter.min(geo.area.width), height);
            let style = if is_cursor {
                self.theme.cursor_row
            } else {
                self.theme.row_head
            };
            buf.set_style(gutter, style);
            let width = gutter.width.saturating_sub(1) as usize;
            let number = format!("{:>width$} ", index + 1);
            buf.set_string(gutter.x, gutter.y, fit(&number, gutter.width), style);
        }
    }

    fn cell_style(
        &self,
        col: usize,
        row: usize,
        is_cursor: bool,
        dirty: bool,
        value: Option<&Value>,
    ) -> Style {
        let base = if self.viewport.is_cell_selected(col, row) {
            self.theme.selection
        } else if is_cursor {
            self.theme.cursor_row
        } else if value.is_none_or(Value::is_null) {
            self.theme.null_cell
        } else {
            self.theme.cell
        };
        if dirty {
            base.patch(self.theme.dirty)
        } else {
            base
        }
    }
}

impl Widget for GridView<'_> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        if self.geometry.area.is_empty() {
            return;
        }
        self.render_header(buf);
        for (index, record) in self.rows {
            self.render_row(*index, record, buf);
        }
    }
}

/// Truncate text to a display width, marking the cut with an ellipsis.
pub(crate) fn fit(text: &str, width: u16) -> String {
    let width = width as usize;
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Flatten line breaks and tabs so a value occupies one display line.
pub(crate) fn single_line(text: &str) -> String {
    text.replace(|c: char| c.is_control(), " ")
}
