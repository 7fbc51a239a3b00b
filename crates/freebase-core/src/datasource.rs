//! The datasource contract.
//!
//! A datasource is an ordered, mutable collection of records. Every
//! mutation publishes exactly one [`RowEvent`] naming the affected row
//! before the call returns. Row indices are always contiguous `0..count`.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::DatasourceResult;
use crate::notifier::SubscriptionId;
use crate::record::{Column, Record};

/// Kind of change a row event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEventKind {
    /// Rows were inserted at the given indexes.
    RowsInsert,
    /// Rows were replaced in place.
    RowsUpdate,
    /// Rows were removed from the given indexes.
    RowsDelete,
    /// The whole row set changed size (reload, clear).
    RowCountChange,
}

/// Change notification published by a datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEvent {
    /// What happened.
    pub kind: RowEventKind,
    /// Row indexes affected by the change.
    pub affected: Vec<usize>,
    /// Row count after the change.
    pub row_count: usize,
}

impl RowEvent {
    /// Create a single-row event.
    pub fn single(kind: RowEventKind, index: usize, row_count: usize) -> Self {
        Self {
            kind,
            affected: vec![index],
            row_count,
        }
    }

    /// Create a row-count change event.
    pub fn count_changed(row_count: usize) -> Self {
        Self {
            kind: RowEventKind::RowCountChange,
            affected: Vec::new(),
            row_count,
        }
    }

    /// Whether the event may have changed the number of rows.
    pub fn changes_count(&self) -> bool {
        !matches!(self.kind, RowEventKind::RowsUpdate)
    }
}

/// An ordered, mutable record collection with change notification.
///
/// Implementations must hand out copies: records returned from [`get`]
/// and records passed to [`insert`]/[`replace`] never alias stored data.
/// Out-of-range indexes fail with `NoSuchRecord` and are never clamped.
///
/// [`get`]: Datasource::get
/// [`insert`]: Datasource::insert
/// [`replace`]: Datasource::replace
pub trait Datasource {
    /// Column descriptors in display order.
    fn columns(&self) -> Vec<Column>;

    /// Current row count.
    fn count(&self) -> usize;

    /// Row count if the backend knows it.
    ///
    /// Backends that page through an open-ended result set return `None`
    /// until the total is known.
    fn count_hint(&self) -> Option<usize> {
        Some(self.count())
    }

    /// Copy of the record at `index`.
    fn get(&self, index: usize) -> DatasourceResult<Record>;

    /// Insert a record before `index`; `index == count` appends.
    fn insert(&mut self, index: usize, record: Record) -> DatasourceResult<()>;

    /// Append a record, returning its index.
    fn add(&mut self, record: Record) -> DatasourceResult<usize> {
        let index = self.count();
        self.insert(index, record)?;
        Ok(index)
    }

    /// Overwrite the record at `index`.
    fn replace(&mut self, index: usize, record: Record) -> DatasourceResult<()>;

    /// Delete the record at `index`, shifting later rows down.
    fn remove(&mut self, index: usize) -> DatasourceResult<Record>;

    /// Register a row event listener.
    fn subscribe(&mut self, listener: Box<dyn FnMut(&RowEvent)>) -> SubscriptionId;

    /// Remove a row event listener.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// A datasource shared between the views of one window.
pub type SharedDatasource = Rc<RefCell<dyn Datasource>>;

/// Wrap a datasource for sharing.
pub fn shared<D: Datasource + 'static>(source: D) -> SharedDatasource {
    Rc::new(RefCell::new(source))
}

/// Binary search over the rows of a sorted datasource.
///
/// `compare(target, row)` orders the target relative to a row. Returns the
/// index of a matching row, or the bitwise complement of the index at which
/// `target` would have to be inserted to keep the order.
pub fn binary_search<D, T, F>(source: &D, target: &T, mut compare: F) -> DatasourceResult<isize>
where
    D: Datasource + ?Sized,
    T: ?Sized,
    F: FnMut(&T, &Record) -> Ordering,
{
    let mut low = 0;
    let mut high = source.count();
    while low < high {
        let mid = low + (high - low) / 2;
        let row = source.get(mid)?;
        match compare(target, &row) {
            Ordering::Less => high = mid,
            Ordering::Greater => low = mid + 1,
            Ordering::Equal => return Ok(mid as isize),
        }
    }
    Ok(!(low as isize))
}

/// Insert a record at its sorted position, returning the index used.
///
/// Equal keys are inserted at the position of the match found.
pub fn insert_sorted<D, F>(source: &mut D, record: Record, compare: F) -> DatasourceResult<usize>
where
    D: Datasource + ?Sized,
    F: FnMut(&Record, &Record) -> Ordering,
{
    let found = binary_search(&*source, &record, compare)?;
    let index = if found >= 0 { found as usize } else { !found as usize };
    source.insert(index, record)?;
    Ok(index)
}
