//! Scroll offset and scrollbar reconciliation.
//!
//! The vertical scrollbar stores its value inverted: `max` is the topmost
//! scroll position and `0` the bottommost, so the value is the distance of
//! the viewport from the bottom of the data. The offset `y` and the
//! scrollbar value are kept separately because a shrinking row set may
//! leave them briefly out of step (see [`ScrollState::reconcile`]).

use tracing::trace;

/// Scroll position of a grid viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    x: usize,
    y: usize,
    max: usize,
    scrollbar_value: usize,
}

impl ScrollState {
    /// Scroll state for a row set, scrolled to the top.
    pub fn new(row_count: usize, fully_visible_rows: usize) -> Self {
        let max = Self::max_for(row_count, fully_visible_rows);
        Self {
            x: 0,
            y: 0,
            max,
            scrollbar_value: max,
        }
    }

    /// Largest valid top row for a row set.
    pub fn max_for(row_count: usize, fully_visible_rows: usize) -> usize {
        row_count.saturating_sub(fully_visible_rows)
    }

    /// First visible column.
    pub fn x(&self) -> usize {
        self.x
    }

    /// First visible row.
    pub fn y(&self) -> usize {
        self.y
    }

    /// Scrollbar maximum.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Inverted scrollbar value.
    pub fn scrollbar_value(&self) -> usize {
        self.scrollbar_value
    }

    /// Whether the offset agrees with the scrollbar.
    pub fn is_consistent(&self) -> bool {
        self.y <= self.max && self.max - self.y == self.scrollbar_value
    }

    /// Scroll to an offset, clamped to the valid range. Returns true if
    /// anything changed.
    pub fn set(&mut self, x: usize, y: usize, column_count: usize) -> bool {
        let x = x.min(column_count.saturating_sub(1));
        let y = y.min(self.max);
        let value = self.max - y;
        let changed = (x, y, value) != (self.x, self.y, self.scrollbar_value);
        self.x = x;
        self.y = y;
        self.scrollbar_value = value;
        changed
    }

    /// Apply a scrollbar-driven value change. Returns true if `y` moved.
    pub fn set_scrollbar_value(&mut self, value: usize) -> bool {
        let value = value.min(self.max);
        let y = self.max - value;
        let changed = y != self.y;
        self.scrollbar_value = value;
        self.y = y;
        changed
    }

    /// Recompute the scrollbar range after the row count or the viewport
    /// height changed. Returns true if `y` moved.
    ///
    /// A top offset that is still valid is kept. Otherwise the distance
    /// from the bottom edge is kept, clamped to the new range. When every
    /// row fits in the viewport the scrollbar collapses to 0 but `y` is left
    /// alone until the next scrollbar-driven change, so the rows on screen
    /// do not jump.
    pub fn reconcile(&mut self, row_count: usize, fully_visible_rows: usize) -> bool {
        let max = Self::max_for(row_count, fully_visible_rows);
        let old_y = self.y;
        if self.y <= max {
            self.scrollbar_value = max - self.y;
        } else if max == 0 {
            self.scrollbar_value = 0;
        } else {
            self.scrollbar_value = self.scrollbar_value.min(max);
            self.y = max - self.scrollbar_value;
        }
        trace!(
            row_count,
            fully_visible_rows,
            max,
            y = self.y,
            value = self.scrollbar_value,
            "Scroll reconciled"
        );
        self.max = max;
        old_y != self.y
    }
}
