//! The grid viewport: scroll, selection and drag handling.

use std::fmt;
use std::ops::Range;

use freebase_core::{ChangeNotifier, GridConfig, RowEvent, SubscriptionId};
use tracing::{debug, trace};

use crate::highlight::{ColumnChange, ColumnHighlight, HighlightDiff, range_diff};
use crate::scroll::ScrollState;
use crate::selection::{CellKind, CellRef, DragMode, Selection};

/// Notifications published by a grid viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// The selection rectangle changed.
    SelectionChanged {
        old: Selection,
        new: Selection,
        diff: HighlightDiff,
    },
    /// The scroll offset changed.
    ScrollChanged {
        x: usize,
        y: usize,
        diff: HighlightDiff,
    },
    /// The drag state machine changed mode.
    DragModeChanged { from: DragMode, to: DragMode },
}

/// A window of rendered rows over a row set.
pub struct GridViewport {
    column_count: usize,
    row_count: usize,
    /// Viewport height in display lines.
    height: usize,
    row_height: usize,
    scroll: ScrollState,
    selection: Selection,
    drag: DragMode,
    drag_anchor: Option<(usize, usize)>,
    text_selection: bool,
    editable: Option<(usize, usize)>,
    highlighted_rows: Option<Range<usize>>,
    column_highlight: Option<ColumnHighlight>,
    notifier: ChangeNotifier<GridEvent>,
}

impl GridViewport {
    /// Create a viewport scrolled to the top with nothing selected.
    pub fn new(column_count: usize, row_count: usize, height: usize, config: &GridConfig) -> Self {
        let row_height = config.row_height.max(1);
        Self {
            column_count,
            row_count,
            height,
            row_height,
            scroll: ScrollState::new(row_count, height / row_height),
            selection: Selection::None,
            drag: DragMode::None,
            drag_anchor: None,
            text_selection: true,
            editable: None,
            highlighted_rows: None,
            column_highlight: None,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Register a listener for grid events.
    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    /// Remove a grid event listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ==================== Geometry ====================

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of rows in the underlying data.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Viewport height in display lines.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows that fit without clipping.
    pub fn fully_visible_row_count(&self) -> usize {
        self.height / self.row_height
    }

    /// Rows rendered, including a partially clipped last row.
    pub fn visible_row_count(&self) -> usize {
        let capacity = self.height.div_ceil(self.row_height);
        capacity.min(self.row_count.saturating_sub(self.scroll.y()))
    }

    /// Data rows currently rendered.
    pub fn visible_rows(&self) -> Range<usize> {
        let start = self.scroll.y();
        start..start + self.visible_row_count()
    }

    /// Change the viewport height.
    pub fn set_viewport_height(&mut self, height: usize) {
        if height == self.height {
            return;
        }
        self.height = height;
        let moved = self
            .scroll
            .reconcile(self.row_count, self.fully_visible_row_count());
        self.publish_scroll(moved);
    }

    /// Change the number of columns, clamping selection and scroll.
    pub fn set_column_count(&mut self, column_count: usize) {
        if column_count == self.column_count {
            return;
        }
        self.column_count = column_count;
        let (x, y) = self.scroll();
        if self.scroll.set(x, y, column_count) {
            self.publish_scroll(true);
        }
        self.apply_selection(self.selection.clamp_columns(column_count));
    }

    /// React to a datasource row event.
    pub fn handle_row_event(&mut self, event: &RowEvent) {
        if event.changes_count() {
            self.set_row_count(event.row_count);
        } else if event
            .affected
            .iter()
            .any(|row| self.visible_rows().contains(row))
        {
            trace!(rows = ?event.affected, "Visible rows updated");
        }
    }

    /// Reconcile scroll and selection with a new row count.
    pub fn set_row_count(&mut self, row_count: usize) {
        if row_count == self.row_count {
            return;
        }
        debug!(from = self.row_count, to = row_count, "Grid row count changed");
        self.row_count = row_count;
        let moved = self
            .scroll
            .reconcile(row_count, self.fully_visible_row_count());
        self.apply_selection(self.selection.clamp_rows(row_count));
        self.publish_scroll(moved);
    }

    // ==================== Scrolling ====================

    /// Scroll offset as `(x, y)`.
    pub fn scroll(&self) -> (usize, usize) {
        (self.scroll.x(), self.scroll.y())
    }

    /// Scrollbar maximum.
    pub fn scrollbar_max(&self) -> usize {
        self.scroll.max()
    }

    /// Inverted scrollbar value (max = top).
    pub fn scrollbar_value(&self) -> usize {
        self.scroll.scrollbar_value()
    }

    /// Whether the offset agrees with the scrollbar.
    pub fn is_scroll_consistent(&self) -> bool {
        self.scroll.is_consistent()
    }

    /// Scroll to a data-space offset, clamped to the valid range.
    pub fn set_scroll(&mut self, x: usize, y: usize) {
        if self.scroll.set(x, y, self.column_count) {
            self.publish_scroll(true);
        }
    }

    /// Scroll by a number of rows.
    pub fn scroll_by(&mut self, rows: isize) {
        let (x, y) = self.scroll();
        self.set_scroll(x, y.saturating_add_signed(rows));
    }

    /// Apply a scrollbar-driven change.
    pub fn set_scrollbar_value(&mut self, value: usize) {
        let before = self.scroll;
        self.scroll.set_scrollbar_value(value);
        if self.scroll != before {
            self.publish_scroll(true);
        }
    }

    /// Scroll the least amount needed to show a row fully.
    pub fn ensure_visible(&mut self, row: usize) {
        let (x, y) = self.scroll();
        let fully = self.fully_visible_row_count().max(1);
        if row < y {
            self.set_scroll(x, row);
        } else if row >= y + fully {
            self.set_scroll(x, row + 1 - fully);
        }
    }

    /// Announce a scroll change. Nothing is published when the offset did
    /// not move and the highlighted window is unchanged.
    fn publish_scroll(&mut self, moved: bool) {
        let diff = self.refresh_highlights();
        if !moved && diff.is_empty() {
            return;
        }
        let (x, y) = self.scroll();
        self.notifier.publish(&GridEvent::ScrollChanged { x, y, diff });
    }

    // ==================== Selection ====================

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Select a rectangle, clamped to the grid.
    pub fn set_selection(&mut self, selection: Selection) {
        let selection = selection
            .clamp_rows(self.row_count)
            .clamp_columns(self.column_count);
        self.apply_selection(selection);
    }

    /// Select `(x1, y1)` to `(x2, y2)`.
    pub fn select(&mut self, x1: usize, y1: usize, x2: usize, y2: usize) {
        self.set_selection(Selection::rect(x1, y1, x2, y2));
    }

    /// Select a whole row.
    pub fn select_row(&mut self, row: usize) {
        let last_col = self.column_count.saturating_sub(1);
        self.set_selection(Selection::rect(0, row, last_col, row));
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.apply_selection(Selection::None);
    }

    /// Selected rows inside the rendered window.
    pub fn highlighted_rows(&self) -> Option<Range<usize>> {
        self.highlighted_rows.clone()
    }

    /// Check if a data row is highlighted in the rendered window.
    pub fn is_row_highlighted(&self, row: usize) -> bool {
        self.highlighted_rows
            .as_ref()
            .is_some_and(|rows| rows.contains(&row))
    }

    /// Current column band.
    pub fn column_highlight(&self) -> Option<&ColumnHighlight> {
        self.column_highlight.as_ref()
    }

    /// Check if a rendered cell is drawn selected.
    pub fn is_cell_selected(&self, col: usize, row: usize) -> bool {
        self.is_row_highlighted(row)
            && self
                .column_highlight
                .as_ref()
                .is_some_and(|band| band.contains(col))
    }

    fn apply_selection(&mut self, new: Selection) {
        let old = self.selection;
        if old == new {
            return;
        }
        self.selection = new;
        let diff = self.refresh_highlights();
        trace!(?old, ?new, "Selection changed");
        self.notifier
            .publish(&GridEvent::SelectionChanged { old, new, diff });
    }

    /// Bring row and column highlighting in line with the selection and the
    /// rendered window, touching only what changed.
    fn refresh_highlights(&mut self) -> HighlightDiff {
        let window = self.visible_rows();
        let target = self.selection.row_range().and_then(|rows| {
            let start = (*rows.start()).max(window.start);
            let end = (*rows.end() + 1).min(window.end);
            (start < end).then_some(start..end)
        });
        let (rows_on, rows_off) = range_diff(self.highlighted_rows.as_ref(), target.as_ref());
        self.highlighted_rows = target;

        let band = self
            .selection
            .col_range()
            .map(|cols| ColumnHighlight::new(*cols.start(), *cols.end()));
        let columns = if band == self.column_highlight {
            ColumnChange::Unchanged
        } else {
            match &band {
                Some(band) => ColumnChange::Set(band.clone()),
                None => ColumnChange::Cleared,
            }
        };
        self.column_highlight = band;

        HighlightDiff {
            rows_on,
            rows_off,
            columns,
        }
    }

    // ==================== Mouse drag ====================

    /// Current drag mode.
    pub fn drag_mode(&self) -> DragMode {
        self.drag
    }

    /// Whether native text selection is allowed.
    pub fn text_selection_enabled(&self) -> bool {
        self.text_selection
    }

    /// The cell currently open for direct editing.
    pub fn editable_cell(&self) -> Option<(usize, usize)> {
        self.editable
    }

    fn set_drag(&mut self, mode: DragMode) {
        if mode == self.drag {
            return;
        }
        let from = self.drag;
        self.drag = mode;
        trace!(%from, to = %mode, "Drag mode changed");
        self.notifier
            .publish(&GridEvent::DragModeChanged { from, to: mode });
    }

    fn in_bounds(&self, cell: CellRef) -> bool {
        match cell.kind {
            CellKind::Middle => cell.col < self.column_count && cell.row < self.row_count,
            CellKind::ColumnHead => cell.col < self.column_count,
            CellKind::RowHead => cell.row < self.row_count,
            CellKind::Corner => true,
        }
    }

    /// Button pressed on a cell.
    pub fn mouse_down(&mut self, cell: CellRef) {
        if !self.in_bounds(cell) {
            trace!(?cell, "Mouse down outside data");
            return;
        }
        let last_row = self.row_count.saturating_sub(1);
        let last_col = self.column_count.saturating_sub(1);
        match cell.kind {
            CellKind::Middle => {
                self.drag_anchor = Some((cell.col, cell.row));
                self.editable = Some((cell.col, cell.row));
                self.text_selection = true;
                self.set_drag(DragMode::Text);
                self.apply_selection(Selection::cell(cell.col, cell.row));
            }
            CellKind::ColumnHead => {
                self.drag_anchor = Some((cell.col, 0));
                self.editable = None;
                self.text_selection = false;
                self.set_drag(DragMode::Columns);
                let selection = if self.row_count == 0 {
                    Selection::None
                } else {
                    Selection::rect(cell.col, 0, cell.col, last_row)
                };
                self.apply_selection(selection);
            }
            CellKind::RowHead => {
                self.drag_anchor = Some((0, cell.row));
                self.editable = None;
                self.text_selection = false;
                self.set_drag(DragMode::Rows);
                let selection = if self.column_count == 0 {
                    Selection::None
                } else {
                    Selection::rect(0, cell.row, last_col, cell.row)
                };
                self.apply_selection(selection);
            }
            CellKind::Corner => {
                self.drag_anchor = None;
                self.editable = None;
                let selection = if self.row_count == 0 || self.column_count == 0 {
                    Selection::None
                } else {
                    Selection::rect(0, 0, last_col, last_row)
                };
                self.apply_selection(selection);
            }
        }
    }

    /// Pointer left a cell.
    pub fn mouse_out(&mut self, cell: CellRef) {
        if self.drag == DragMode::Text && self.is_anchor(cell) {
            self.begin_cell_drag();
        }
    }

    /// Pointer entered a cell.
    pub fn mouse_over(&mut self, cell: CellRef) {
        if self.drag == DragMode::None || !self.in_bounds(cell) {
            return;
        }

        if self.is_anchor(cell) {
            if self.drag == DragMode::Cells {
                self.editable = self.drag_anchor;
                self.text_selection = true;
                self.set_drag(DragMode::Text);
            }
        } else if self.drag == DragMode::Text && cell.kind == CellKind::Middle {
            // Moved to another cell without a mouse-out for the anchor.
            self.begin_cell_drag();
        }

        let Selection::Rect { x1, y1, x2, y2 } = self.selection else {
            return;
        };
        let last_row = self.row_count.saturating_sub(1);
        let last_col = self.column_count.saturating_sub(1);
        let far = match (self.drag, cell.kind) {
            (DragMode::Text | DragMode::Cells, CellKind::Middle) => (cell.col, cell.row),
            (DragMode::Text | DragMode::Cells, CellKind::ColumnHead) => (cell.col, y2),
            (DragMode::Text | DragMode::Cells, CellKind::RowHead) => (x2, cell.row),
            (DragMode::Columns, CellKind::Middle | CellKind::ColumnHead) => (cell.col, last_row),
            (DragMode::Rows, CellKind::Middle | CellKind::RowHead) => (last_col, cell.row),
            _ => return,
        };
        self.apply_selection(Selection::rect(x1, y1, far.0, far.1));
    }

    /// Button released anywhere.
    pub fn mouse_up(&mut self) {
        self.end_drag();
    }

    /// Pointer left the viewport; ends any drag.
    pub fn leave_viewport(&mut self) {
        self.end_drag();
    }

    fn is_anchor(&self, cell: CellRef) -> bool {
        cell.kind == CellKind::Middle && self.drag_anchor == Some((cell.col, cell.row))
    }

    fn begin_cell_drag(&mut self) {
        self.text_selection = false;
        self.editable = None;
        self.set_drag(DragMode::Cells);
    }

    fn end_drag(&mut self) {
        self.drag_anchor = None;
        // Keyboard selection must keep working after a drag.
        self.text_selection = true;
        self.set_drag(DragMode::None);
    }
}

impl fmt::Debug for GridViewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridViewport")
            .field("column_count", &self.column_count)
            .field("row_count", &self.row_count)
            .field("height", &self.height)
            .field("scroll", &self.scroll)
            .field("selection", &self.selection)
            .field("drag", &self.drag)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn viewport(rows: usize) -> GridViewport {
        GridViewport::new(4, rows, 10, &GridConfig::default())
    }

    #[test]
    fn test_visible_rows() {
        let mut grid = viewport(25);
        assert_eq!(grid.fully_visible_row_count(), 10);
        assert_eq!(grid.visible_rows(), 0..10);
        grid.set_scroll(0, 100);
        assert_eq!(grid.scroll(), (0, 15));
        assert_eq!(grid.visible_rows(), 15..25);
    }

    #[test]
    fn test_partial_row_counts_as_visible() {
        let config = GridConfig::builder().row_height(3usize).build().unwrap();
        let grid = GridViewport::new(2, 100, 10, &config);
        assert_eq!(grid.fully_visible_row_count(), 3);
        assert_eq!(grid.visible_row_count(), 4);
    }

    #[test]
    fn test_ensure_visible() {
        let mut grid = viewport(100);
        grid.ensure_visible(15);
        assert_eq!(grid.scroll().1, 6);
        grid.ensure_visible(2);
        assert_eq!(grid.scroll().1, 2);
        grid.ensure_visible(5);
        assert_eq!(grid.scroll().1, 2);
    }

    #[test]
    fn test_highlight_only_inside_window() {
        let mut grid = viewport(100);
        grid.select(0, 5, 1, 50);
        assert!(grid.is_row_highlighted(9));
        assert!(!grid.is_row_highlighted(10));
        assert!(grid.is_cell_selected(1, 5));
        assert!(!grid.is_cell_selected(2, 5));
    }

    #[test]
    fn test_quiet_resize_publishes_nothing() {
        let mut grid = viewport(100);
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        grid.subscribe(move |event| {
            if let GridEvent::ScrollChanged { .. } = event {
                seen.set(seen.get() + 1);
            }
        });

        grid.set_row_count(120);
        grid.set_viewport_height(12);
        assert_eq!(count.get(), 0);

        // A selected row entering the window is worth announcing
        grid.select_row(15);
        grid.set_viewport_height(20);
        assert_eq!(count.get(), 1);

        grid.set_scroll(0, 200);
        grid.set_row_count(50);
        assert_eq!(grid.scroll().1, 30);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_set_selection_clamps() {
        let mut grid = viewport(5);
        grid.select(9, 2, 0, 9);
        assert_eq!(grid.selection(), Selection::rect(3, 2, 0, 4));
    }
}
