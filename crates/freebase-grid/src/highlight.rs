//! Incremental highlight bookkeeping.

use std::ops::Range;

use itertools::Itertools;

/// The column band currently highlighted.
///
/// Column highlighting is one generated style rule covering every selected
/// column, so redrawing it costs the same regardless of the row count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnHighlight {
    /// First highlighted column.
    pub first: usize,
    /// Last highlighted column (inclusive).
    pub last: usize,
}

impl ColumnHighlight {
    /// Create a band over `first..=last`.
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Check if a column is inside the band.
    pub fn contains(&self, col: usize) -> bool {
        (self.first..=self.last).contains(&col)
    }

    /// Stylesheet rule selecting the band, e.g. `.col-1, .col-2 { ... }`.
    ///
    /// This is the form for front ends that render the grid as HTML with a
    /// `col-N` class on every cell: swapping one rule recolors the whole
    /// band. Cell-by-cell renderers such as the terminal UI test
    /// [`contains`](Self::contains) instead.
    pub fn rule(&self, declarations: &str) -> String {
        let selectors = (self.first..=self.last)
            .map(|col| format!(".col-{col}"))
            .join(", ");
        format!("{selectors} {{ {declarations} }}")
    }
}

/// What happened to the column band.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnChange {
    /// Same x-bounds as before; nothing to regenerate.
    #[default]
    Unchanged,
    /// New x-bounds.
    Set(ColumnHighlight),
    /// Selection went away.
    Cleared,
}

/// Rows and columns whose highlight state changed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightDiff {
    /// Data rows that became highlighted.
    pub rows_on: Vec<usize>,
    /// Data rows that stopped being highlighted.
    pub rows_off: Vec<usize>,
    /// Column band change.
    pub columns: ColumnChange,
}

impl HighlightDiff {
    /// Check if nothing needs redrawing.
    pub fn is_empty(&self) -> bool {
        self.rows_on.is_empty()
            && self.rows_off.is_empty()
            && self.columns == ColumnChange::Unchanged
    }
}

/// Rows entering and leaving a highlighted span.
///
/// Returns `(on, off)`: rows in `new` but not `old`, and rows in `old` but
/// not `new`. Cost is proportional to the two spans, not to the data.
pub(crate) fn range_diff(
    old: Option<&Range<usize>>,
    new: Option<&Range<usize>>,
) -> (Vec<usize>, Vec<usize>) {
    let inside = |range: Option<&Range<usize>>, row: usize| range.is_some_and(|r| r.contains(&row));
    let on = new
        .into_iter()
        .flat_map(Clone::clone)
        .filter(|row| !inside(old, *row))
        .collect();
    let off = old
        .into_iter()
        .flat_map(Clone::clone)
        .filter(|row| !inside(new, *row))
        .collect();
    (on, off)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_diff_overlap() {
        let (on, off) = range_diff(Some(&(2..6)), Some(&(4..8)));
        assert_eq!(on, vec![6, 7]);
        assert_eq!(off, vec![2, 3]);
    }

    #[test]
    fn test_range_diff_from_nothing() {
        let (on, off) = range_diff(None, Some(&(0..3)));
        assert_eq!(on, vec![0, 1, 2]);
        assert!(off.is_empty());

        let (on, off) = range_diff(Some(&(0..3)), None);
        assert!(on.is_empty());
        assert_eq!(off, vec![0, 1, 2]);
    }

    #[test]
    fn test_range_diff_identical() {
        let (on, off) = range_diff(Some(&(1..4)), Some(&(1..4)));
        assert!(on.is_empty() && off.is_empty());
    }

    #[test]
    fn test_column_rule() {
        let band = ColumnHighlight::new(1, 3);
        assert_eq!(
            band.rule("background: yellow"),
            ".col-1, .col-2, .col-3 { background: yellow }"
        );
        assert!(band.contains(2));
        assert!(!band.contains(4));
    }
}
