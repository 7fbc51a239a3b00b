//! UI components and widgets.

mod editor;
mod grid;
mod help;
pub mod modals;
mod navbar;

pub use editor::RecordEditor;
pub use grid::GridView;
pub use help::HelpOverlay;
pub use navbar::NavBarView;

use freebase_grid::CellRef;
use ratatui::layout::{Constraint, Layout, Position, Rect};

/// Layout areas for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub grid: Rect,
    pub editor: Option<Rect>,
    pub navbar: Rect,
    pub footer: Rect,
}

impl AppLayout {
    /// Compute layout from terminal area.
    pub fn new(area: Rect) -> Self {
        let min_grid_width = 40;
        let editor_width = 36;

        let [header, content, navbar, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let (grid, editor) = if area.width >= min_grid_width + editor_width {
            let [grid, editor] = Layout::horizontal([
                Constraint::Min(min_grid_width),
                Constraint::Length(editor_width),
            ])
            .areas(content);
            (grid, Some(editor))
        } else {
            (content, None)
        };

        Self {
            header,
            grid,
            editor,
            navbar,
            footer,
        }
    }
}

/// Where grid cells land on screen.
///
/// The first line of the grid area holds the column headers and the left
/// gutter the row numbers; data cells follow at a fixed column width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridGeometry {
    pub area: Rect,
    pub gutter: u16,
    pub column_width: u16,
    pub first_column: usize,
    pub column_count: usize,
    pub first_row: usize,
    pub row_count: usize,
    pub row_height: u16,
}

impl GridGeometry {
    /// Gutter wide enough for the largest 1-based row number.
    pub fn gutter_for(row_count: usize) -> u16 {
        let digits = row_count.max(1).to_string().len() as u16;
        digits + 2
    }

    /// Display lines available for data rows.
    pub fn body_height(&self) -> usize {
        self.area.height.saturating_sub(1) as usize
    }

    /// Columns that fit, starting at `first_column`.
    pub fn visible_columns(&self) -> usize {
        let usable = self.area.width.saturating_sub(self.gutter);
        let fit = usable.div_ceil(self.column_width.max(1)) as usize;
        fit.min(self.column_count.saturating_sub(self.first_column))
    }

    /// Columns that fit without clipping.
    pub fn fully_visible_columns(&self) -> usize {
        let usable = self.area.width.saturating_sub(self.gutter);
        let fit = (usable / self.column_width.max(1)) as usize;
        fit.min(self.column_count.saturating_sub(self.first_column))
    }

    /// Screen rectangle of a data cell, if it is on screen.
    pub fn cell_rect(&self, col: usize, row: usize) -> Option<Rect> {
        let rel_col = col.checked_sub(self.first_column)?;
        let rel_row = row.checked_sub(self.first_row)?;
        if rel_col >= self.visible_columns() {
            return None;
        }
        let x = self.area.x + self.gutter + rel_col as u16 * self.column_width;
        let y = self.area.y + 1 + rel_row as u16 * self.row_height.max(1);
        if y >= self.area.bottom() {
            return None;
        }
        let width = self.column_width.min(self.area.right().saturating_sub(x));
        let height = self.row_height.max(1).min(self.area.bottom() - y);
        Some(Rect::new(x, y, width, height))
    }

    /// Map a terminal position to the grid cell under it.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<CellRef> {
        if !self.area.contains(Position::new(column, row)) {
            return None;
        }
        let dx = column - self.area.x;
        let dy = row - self.area.y;

        let in_header = dy == 0;
        let in_gutter = dx < self.gutter;

        let col_offset = dx.saturating_sub(self.gutter) / self.column_width.max(1);
        let row_offset = dy.saturating_sub(1) / self.row_height.max(1);
        let col = self.first_column + col_offset as usize;
        let data_row = self.first_row + row_offset as usize;

        match (in_header, in_gutter) {
            (true, true) => Some(CellRef::corner()),
            (true, false) => (col < self.column_count).then(|| CellRef::column_head(col)),
            (false, true) => (data_row < self.row_count).then(|| CellRef::row_head(data_row)),
            (false, false) => (col < self.column_count && data_row < self.row_count)
                .then(|| CellRef::middle(col, data_row)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freebase_grid::CellKind;

    fn geometry() -> GridGeometry {
        GridGeometry {
            area: Rect::new(0, 1, 40, 11),
            gutter: 4,
            column_width: 10,
            first_column: 0,
            column_count: 3,
            first_row: 20,
            row_count: 100,
            row_height: 1,
        }
    }

    #[test]
    fn test_layout_hides_editor_when_narrow() {
        let wide = AppLayout::new(Rect::new(0, 0, 120, 30));
        assert!(wide.editor.is_some());
        assert_eq!(wide.grid.height, 27);

        let narrow = AppLayout::new(Rect::new(0, 0, 60, 30));
        assert!(narrow.editor.is_none());
        assert_eq!(narrow.grid.width, 60);
    }

    #[test]
    fn test_hit_test_regions() {
        let geo = geometry();
        assert_eq!(geo.hit_test(0, 1), Some(CellRef::corner()));
        assert_eq!(geo.hit_test(15, 1), Some(CellRef::column_head(1)));
        assert_eq!(geo.hit_test(2, 3), Some(CellRef::row_head(21)));
        assert_eq!(geo.hit_test(25, 2), Some(CellRef::middle(2, 20)));

        // Past the last column and outside the area
        assert_eq!(geo.hit_test(38, 4), None);
        assert_eq!(geo.hit_test(5, 0), None);
    }

    #[test]
    fn test_hit_test_tall_rows() {
        let geo = GridGeometry {
            row_height: 2,
            ..geometry()
        };
        let cell = geo.hit_test(5, 4).unwrap();
        assert_eq!(cell.kind, CellKind::Middle);
        assert_eq!(cell.row, 21);
    }

    #[test]
    fn test_cell_rect() {
        let geo = geometry();
        assert_eq!(geo.cell_rect(1, 22), Some(Rect::new(14, 4, 10, 1)));
        assert_eq!(geo.cell_rect(1, 19), None);
        assert_eq!(geo.cell_rect(1, 40), None);
    }

    #[test]
    fn test_gutter_width() {
        assert_eq!(GridGeometry::gutter_for(0), 3);
        assert_eq!(GridGeometry::gutter_for(9_999), 6);
    }
}
