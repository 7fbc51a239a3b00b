//! Selection rectangle and drag state.

use std::ops::RangeInclusive;

use strum::Display;

/// A rectangular cell selection in data space.
///
/// `(x1, y1)` is the anchor cell and `(x2, y2)` the far corner; both are
/// inclusive and independent of the scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// Column/row coordinates of anchor and far corner.
    Rect {
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
    },
}

impl Selection {
    /// Rectangle from anchor to far corner.
    pub fn rect(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self::Rect { x1, y1, x2, y2 }
    }

    /// A single cell.
    pub fn cell(x: usize, y: usize) -> Self {
        Self::rect(x, y, x, y)
    }

    /// Check if nothing is selected.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Anchor cell.
    pub fn anchor(&self) -> Option<(usize, usize)> {
        match *self {
            Self::Rect { x1, y1, .. } => Some((x1, y1)),
            Self::None => None,
        }
    }

    /// Far corner cell.
    pub fn far_corner(&self) -> Option<(usize, usize)> {
        match *self {
            Self::Rect { x2, y2, .. } => Some((x2, y2)),
            Self::None => None,
        }
    }

    /// The same cells with the anchor at the top-left.
    pub fn normalized(&self) -> Self {
        match (self.col_range(), self.row_range()) {
            (Some(cols), Some(rows)) => {
                Self::rect(*cols.start(), *rows.start(), *cols.end(), *rows.end())
            }
            _ => Self::None,
        }
    }

    /// Selected rows, lowest first.
    pub fn row_range(&self) -> Option<RangeInclusive<usize>> {
        match *self {
            Self::Rect { y1, y2, .. } => Some(y1.min(y2)..=y1.max(y2)),
            Self::None => None,
        }
    }

    /// Selected columns, leftmost first.
    pub fn col_range(&self) -> Option<RangeInclusive<usize>> {
        match *self {
            Self::Rect { x1, x2, .. } => Some(x1.min(x2)..=x1.max(x2)),
            Self::None => None,
        }
    }

    /// Check if a cell lies inside the selection.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        match (self.col_range(), self.row_range()) {
            (Some(cols), Some(rows)) => cols.contains(&x) && rows.contains(&y),
            _ => false,
        }
    }

    /// Legacy `(x1, y1, x2, y2)` tuple with `-1` meaning no selection.
    pub fn to_sentinel(&self) -> (i64, i64, i64, i64) {
        match *self {
            Self::Rect { x1, y1, x2, y2 } => (x1 as i64, y1 as i64, x2 as i64, y2 as i64),
            Self::None => (-1, -1, -1, -1),
        }
    }

    /// Fit the selection to a smaller row count.
    ///
    /// A selection entirely past the last row collapses to nothing;
    /// otherwise coordinates beyond it are pulled back to the last row.
    pub fn clamp_rows(self, row_count: usize) -> Self {
        let Self::Rect { x1, y1, x2, y2 } = self else {
            return self;
        };
        if y1.min(y2) >= row_count {
            return Self::None;
        }
        let last = row_count - 1;
        Self::Rect {
            x1,
            y1: y1.min(last),
            x2,
            y2: y2.min(last),
        }
    }

    /// Fit the selection to a smaller column count.
    pub fn clamp_columns(self, column_count: usize) -> Self {
        let Self::Rect { x1, y1, x2, y2 } = self else {
            return self;
        };
        if x1.min(x2) >= column_count {
            return Self::None;
        }
        let last = column_count - 1;
        Self::Rect {
            x1: x1.min(last),
            y1,
            x2: x2.min(last),
            y2,
        }
    }
}

/// How an in-progress mouse drag is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum DragMode {
    /// No button held.
    #[default]
    #[strum(to_string = "none")]
    None,
    /// Button went down on a cell; the cell is being edited as text.
    #[strum(to_string = "text")]
    Text,
    /// The pointer left the anchor cell; a cell block is being selected.
    #[strum(to_string = "cells")]
    Cells,
    /// Dragging across column headers.
    #[strum(to_string = "columns")]
    Columns,
    /// Dragging across row headers.
    #[strum(to_string = "rows")]
    Rows,
}

/// Which part of the grid a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// A data cell.
    Middle,
    /// A column header; only the column is meaningful.
    ColumnHead,
    /// A row header; only the row is meaningful.
    RowHead,
    /// The top-left corner above the row headers.
    Corner,
}

/// A hit-tested grid cell in data space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub kind: CellKind,
    pub col: usize,
    pub row: usize,
}

impl CellRef {
    /// A data cell.
    pub fn middle(col: usize, row: usize) -> Self {
        Self {
            kind: CellKind::Middle,
            col,
            row,
        }
    }

    /// A column header.
    pub fn column_head(col: usize) -> Self {
        Self {
            kind: CellKind::ColumnHead,
            col,
            row: 0,
        }
    }

    /// A row header.
    pub fn row_head(row: usize) -> Self {
        Self {
            kind: CellKind::RowHead,
            col: 0,
            row,
        }
    }

    /// The corner cell.
    pub fn corner() -> Self {
        Self {
            kind: CellKind::Corner,
            col: 0,
            row: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_are_normalized() {
        let sel = Selection::rect(4, 9, 1, 2);
        assert_eq!(sel.col_range(), Some(1..=4));
        assert_eq!(sel.row_range(), Some(2..=9));
        assert!(sel.contains(2, 5));
        assert!(!sel.contains(5, 5));
        assert_eq!(sel.anchor(), Some((4, 9)));
        assert_eq!(sel.far_corner(), Some((1, 2)));
        assert_eq!(sel.normalized(), Selection::rect(1, 2, 4, 9));
    }

    #[test]
    fn test_sentinel() {
        assert_eq!(Selection::None.to_sentinel(), (-1, -1, -1, -1));
        assert_eq!(Selection::rect(0, 1, 2, 3).to_sentinel(), (0, 1, 2, 3));
    }

    #[test]
    fn test_clamp_rows() {
        let sel = Selection::rect(0, 1, 3, 15);
        assert_eq!(sel.clamp_rows(8), Selection::rect(0, 1, 3, 7));
        assert_eq!(sel.clamp_rows(1), Selection::None);
        assert_eq!(sel.clamp_rows(0), Selection::None);
        assert_eq!(sel.clamp_rows(100), sel);
    }

    #[test]
    fn test_clamp_columns() {
        let sel = Selection::rect(5, 0, 2, 0);
        assert_eq!(sel.clamp_columns(4), Selection::rect(3, 0, 2, 0));
        assert_eq!(sel.clamp_columns(2), Selection::None);
    }

    #[test]
    fn test_drag_mode_display() {
        assert_eq!(DragMode::Cells.to_string(), "cells");
        assert_eq!(DragMode::default(), DragMode::None);
    }
}
