//! The record cursor.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use freebase_core::{
    Cancelable, ChangeNotifier, Column, Datasource, DatasourceResult, Record, RowEvent,
    RowEventKind, SharedDatasource, SubscriptionId, Value,
};
use tracing::{debug, trace, warn};

use crate::error::{CursorError, CursorResult};
use crate::position::Position;

/// Notifications published by a cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorEvent {
    /// The cursor moved (or reloaded its current position).
    Moved {
        from: Position,
        to: Position,
        /// Row count after the move, if known.
        row_count: Option<usize>,
    },
    /// Unsaved edits are about to be thrown away. Delivered cancelable.
    BeforeDiscard {
        position: Position,
        dirty_fields: Vec<String>,
    },
    /// Unsaved edits were thrown away.
    Discarded { position: Position },
    /// A new, unsaved record is being composed.
    NewRecord,
    /// A field of the scratch record was edited.
    FieldChanged { name: String },
    /// The scratch record was written to the datasource.
    Saved { index: usize, created: bool },
}

/// Result of a navigation request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The cursor now points at the given position.
    Moved(Position),
    /// A before-discard listener vetoed leaving the dirty record.
    Blocked,
}

impl MoveOutcome {
    /// Whether the move happened.
    pub fn is_moved(self) -> bool {
        matches!(self, Self::Moved(_))
    }
}

/// Result of a discard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardOutcome {
    /// Nothing to discard.
    NotDirty,
    /// Edits were reset to the loaded values.
    Discarded,
    /// A listener vetoed the discard; edits are kept.
    Blocked,
}

/// A position pointer plus scratch values over one datasource.
///
/// The cursor subscribes to the datasource's row events when created. They
/// are queued while the datasource publishes and applied on the cursor's
/// next navigation, edit or [`apply_source_events`] call, so an insert or
/// delete elsewhere keeps the cursor on the same record.
///
/// [`apply_source_events`]: Cursor::apply_source_events
pub struct Cursor {
    source: SharedDatasource,
    position: Position,
    loaded: Record,
    current: Record,
    events: ChangeNotifier<CursorEvent>,
    discard_checks: ChangeNotifier<Cancelable<CursorEvent>>,
    /// Row events not yet applied to the position.
    pending: Rc<RefCell<Vec<RowEvent>>>,
    /// Set while the cursor writes to the datasource itself.
    muted: Rc<Cell<bool>>,
    subscription: SubscriptionId,
}

impl Cursor {
    /// Create a cursor at BOF.
    pub fn new(source: SharedDatasource) -> Self {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let muted = Rc::new(Cell::new(false));
        let queue = Rc::clone(&pending);
        let quiet = Rc::clone(&muted);
        let subscription = source
            .borrow_mut()
            .subscribe(Box::new(move |event: &RowEvent| {
                if !quiet.get() {
                    queue.borrow_mut().push(event.clone());
                }
            }));

        Self {
            source,
            position: Position::Bof,
            loaded: Record::new(),
            current: Record::new(),
            events: ChangeNotifier::new(),
            discard_checks: ChangeNotifier::new(),
            pending,
            muted,
            subscription,
        }
    }

    /// The bound datasource.
    pub fn source(&self) -> &SharedDatasource {
        &self.source
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Check if positioned before the first record.
    pub fn is_bof(&self) -> bool {
        self.position == Position::Bof
    }

    /// Check if positioned after the last record.
    pub fn is_eof(&self) -> bool {
        self.position == Position::Eof
    }

    /// Check if composing a new record.
    pub fn is_new(&self) -> bool {
        self.position == Position::New
    }

    /// Row count of the datasource, if known.
    pub fn row_count(&self) -> Option<usize> {
        self.source.borrow().count_hint()
    }

    /// Column set of the datasource.
    pub fn columns(&self) -> Vec<Column> {
        self.source.borrow().columns()
    }

    /// Values as last read from the datasource.
    pub fn loaded_values(&self) -> &Record {
        &self.loaded
    }

    /// Scratch values being edited.
    pub fn current_values(&self) -> &Record {
        &self.current
    }

    /// Register a listener for cursor events.
    pub fn subscribe(&mut self, listener: impl FnMut(&CursorEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Remove a cursor event listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Register a listener that may veto discarding unsaved edits.
    pub fn subscribe_discard(
        &mut self,
        listener: impl FnMut(&Cancelable<CursorEvent>) + 'static,
    ) -> SubscriptionId {
        self.discard_checks.subscribe(listener)
    }

    /// Remove a before-discard listener.
    pub fn unsubscribe_discard(&mut self, id: SubscriptionId) -> bool {
        self.discard_checks.unsubscribe(id)
    }

    // ==================== Navigation ====================

    /// Move to an explicit position.
    ///
    /// A row past the end fails even when the row count is unknown.
    pub fn set_position(&mut self, position: Position) -> CursorResult<MoveOutcome> {
        self.apply_source_events();
        if let Position::Row(index) = position {
            if let Some(count) = self.row_count() {
                if index >= count {
                    return Err(CursorError::illegal_move(
                        self.position,
                        format!("row {} is out of range (row count {count})", index + 1),
                    ));
                }
            }
        }
        self.go_to(position)
    }

    /// Move to the first record, or EOF when there are none.
    pub fn move_first(&mut self) -> CursorResult<MoveOutcome> {
        self.apply_source_events();
        let target = match self.row_count() {
            Some(0) => Position::Eof,
            _ => Position::Row(0),
        };
        self.go_toward(target)
    }

    /// Move to the last record. Requires a known row count.
    pub fn move_last(&mut self) -> CursorResult<MoveOutcome> {
        self.apply_source_events();
        let target = match self.row_count() {
            None => {
                return Err(CursorError::illegal_move(
                    self.position,
                    "row count is unknown",
                ));
            }
            Some(0) => Position::Bof,
            Some(count) => Position::Row(count - 1),
        };
        self.go_to(target)
    }

    /// Move `rows` records forward.
    pub fn move_forward(&mut self, rows: usize) -> CursorResult<MoveOutcome> {
        self.apply_source_events();
        let target = self.forward_target(rows)?;
        self.go_toward(target)
    }

    /// Move `rows` records backward.
    pub fn move_backward(&mut self, rows: usize) -> CursorResult<MoveOutcome> {
        self.apply_source_events();
        let target = self.backward_target(rows)?;
        self.go_to(target)
    }

    /// Start composing a new record.
    pub fn new_record(&mut self) -> CursorResult<MoveOutcome> {
        self.apply_source_events();
        let outcome = self.go_to(Position::New)?;
        if outcome.is_moved() {
            self.events.publish(&CursorEvent::NewRecord);
        }
        Ok(outcome)
    }

    fn forward_target(&self, rows: usize) -> CursorResult<Position> {
        if rows == 0 {
            return Err(CursorError::illegal_move(
                self.position,
                "row delta must be positive",
            ));
        }
        let count = self.row_count();
        match self.position {
            Position::Bof => Ok(match count {
                Some(count) if rows - 1 < count => Position::Row(rows - 1),
                _ => Position::Eof,
            }),
            Position::Eof | Position::New => Err(CursorError::illegal_move(
                self.position,
                "cannot move forward past EOF",
            )),
            Position::Row(index) => Ok(match count {
                Some(count) if index + rows >= count => Position::Eof,
                _ => Position::Row(index + rows),
            }),
        }
    }

    fn backward_target(&self, rows: usize) -> CursorResult<Position> {
        if rows == 0 {
            return Err(CursorError::illegal_move(
                self.position,
                "row delta must be positive",
            ));
        }
        match self.position {
            Position::Bof => Err(CursorError::illegal_move(
                self.position,
                "cannot move backward past BOF",
            )),
            // Without a row count the best effort is position 0 minus rows.
            Position::Eof | Position::New => Ok(match self.row_count() {
                Some(count) if count >= rows => Position::Row(count - rows),
                _ => Position::Bof,
            }),
            Position::Row(index) => Ok(match index.checked_sub(rows) {
                Some(target) => Position::Row(target),
                None => Position::Bof,
            }),
        }
    }

    /// Move to a target that must exist.
    fn go_to(&mut self, target: Position) -> CursorResult<MoveOutcome> {
        let loaded = self.load(target)?;
        self.enter(target, loaded)
    }

    /// Move toward a target found by scanning. Running off the end of a
    /// source with an unknown row count lands on EOF instead of failing.
    fn go_toward(&mut self, target: Position) -> CursorResult<MoveOutcome> {
        let unbounded = self.row_count().is_none();
        match self.load(target) {
            Ok(loaded) => self.enter(target, loaded),
            Err(CursorError::Datasource(err)) if unbounded && err.is_no_such_record() => {
                trace!(to = %target, "Ran off the end, landing on EOF");
                self.enter(Position::Eof, Record::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Leave the current record for an already loaded target.
    fn enter(&mut self, target: Position, loaded: Record) -> CursorResult<MoveOutcome> {
        if self.maybe_discard() == DiscardOutcome::Blocked {
            debug!(from = %self.position, to = %target, "Move blocked by discard veto");
            return Ok(MoveOutcome::Blocked);
        }
        self.settle(target, loaded);
        Ok(MoveOutcome::Moved(target))
    }

    /// Point at `target` with fresh values and announce it.
    fn settle(&mut self, target: Position, loaded: Record) {
        let from = self.position;
        self.position = target;
        self.current = loaded.clone();
        self.loaded = loaded;

        trace!(%from, to = %target, "Cursor moved");
        let event = CursorEvent::Moved {
            from,
            to: target,
            row_count: self.row_count(),
        };
        self.events.publish(&event);
    }

    /// Read the values for a target position.
    fn load(&self, target: Position) -> CursorResult<Record> {
        match target {
            Position::Row(index) => Ok(self.source.borrow().get(index)?),
            _ => Ok(Record::new()),
        }
    }

    /// Run a write against the datasource without queueing its own events.
    fn write<T>(
        &self,
        op: impl FnOnce(&mut dyn Datasource) -> DatasourceResult<T>,
    ) -> DatasourceResult<T> {
        self.muted.set(true);
        let result = op(&mut *self.source.borrow_mut());
        self.muted.set(false);
        result
    }

    // ==================== Datasource changes ====================

    /// Apply row events queued since the last call. Returns true if the
    /// cursor ended up on another row or its loaded values changed.
    pub fn apply_source_events(&mut self) -> bool {
        let events = std::mem::take(&mut *self.pending.borrow_mut());
        if events.is_empty() {
            return false;
        }
        let position = self.position;
        let loaded = self.loaded.clone();
        for event in &events {
            self.handle_row_event(event);
        }
        self.position != position || self.loaded != loaded
    }

    /// Keep the cursor on its record across a datasource change.
    ///
    /// Rows inserted at or before the cursor row push it down, rows deleted
    /// before it pull it up. When its own row is deleted the cursor moves to
    /// the record that took its place, or EOF. An update of its row refreshes
    /// the loaded values. Must not be called while the datasource is
    /// publishing.
    pub fn handle_row_event(&mut self, event: &RowEvent) {
        let Position::Row(index) = self.position else {
            return;
        };
        let mut affected = event.affected.clone();
        affected.sort_unstable();

        match event.kind {
            RowEventKind::RowsInsert => {
                let row = affected
                    .iter()
                    .fold(index, |row, &at| if at <= row { row + 1 } else { row });
                self.shift(row);
            }
            RowEventKind::RowsDelete => {
                let mut row = index;
                let mut removed = false;
                for &at in affected.iter().rev() {
                    match at.cmp(&row) {
                        Ordering::Less => row -= 1,
                        Ordering::Equal => removed = true,
                        Ordering::Greater => {}
                    }
                }
                if removed {
                    debug!(index, "Cursor row deleted");
                    self.replaced(row, event.row_count);
                } else {
                    self.shift(row);
                }
            }
            RowEventKind::RowsUpdate => {
                if affected.binary_search(&index).is_ok() {
                    self.refresh();
                }
            }
            RowEventKind::RowCountChange => {
                if index >= event.row_count {
                    self.replaced(index, event.row_count);
                } else {
                    self.refresh();
                }
            }
        }
    }

    /// Same record, new index.
    fn shift(&mut self, row: usize) {
        let from = self.position;
        if from == Position::Row(row) {
            return;
        }
        self.position = Position::Row(row);
        trace!(%from, to = row, "Cursor row shifted");
        let event = CursorEvent::Moved {
            from,
            to: self.position,
            row_count: self.row_count(),
        };
        self.events.publish(&event);
    }

    /// The cursor's record is gone; take whatever now sits at `row`.
    fn replaced(&mut self, row: usize, row_count: usize) {
        let loaded = if row < row_count {
            self.source.borrow().get(row).ok()
        } else {
            None
        };
        match loaded {
            Some(record) => self.settle(Position::Row(row), record),
            None => self.settle(Position::Eof, Record::new()),
        }
    }

    /// Pick up new values for the current row. Unsaved edits survive and
    /// are compared against the new values from then on.
    fn refresh(&mut self) {
        let Position::Row(index) = self.position else {
            return;
        };
        if !self.is_dirty() {
            if let Err(err) = self.reload() {
                warn!(index, error = %err, "Failed to reload cursor row");
            }
            return;
        }
        match self.source.borrow().get(index) {
            Ok(record) => self.loaded = record,
            Err(err) => warn!(index, error = %err, "Failed to refresh cursor row"),
        }
    }

    // ==================== Dirty tracking ====================

    /// Whether the scratch values differ from the loaded ones.
    pub fn is_dirty(&self) -> bool {
        !self.current.loose_eq(&self.loaded)
    }

    /// Names of fields whose scratch value differs from the loaded one.
    pub fn dirty_fields(&self) -> Vec<String> {
        self.current.changed_fields(&self.loaded)
    }

    /// Ask listeners whether unsaved edits may be thrown away, and do so
    /// unless one of them cancels.
    pub fn maybe_discard(&mut self) -> DiscardOutcome {
        if !self.is_dirty() {
            return DiscardOutcome::NotDirty;
        }
        let check = Cancelable::new(CursorEvent::BeforeDiscard {
            position: self.position,
            dirty_fields: self.dirty_fields(),
        });
        self.discard_checks.publish(&check);
        if check.is_canceled() {
            return DiscardOutcome::Blocked;
        }
        self.discard();
        DiscardOutcome::Discarded
    }

    /// Reset the scratch values without asking.
    pub fn discard(&mut self) {
        if !self.is_dirty() {
            return;
        }
        self.current = self.loaded.clone();
        debug!(position = %self.position, "Discarded edits");
        self.events.publish(&CursorEvent::Discarded {
            position: self.position,
        });
    }

    // ==================== Field access ====================

    fn check_field(&self, name: &str) -> CursorResult<()> {
        if !self.position.has_record() {
            return Err(CursorError::NoCurrentRecord);
        }
        if !self.source.borrow().columns().iter().any(|c| c.name == name) {
            return Err(CursorError::NoSuchField {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Scratch value of a field (null when the record lacks it).
    pub fn field_value(&self, name: &str) -> CursorResult<Value> {
        self.check_field(name)?;
        Ok(self.current.get(name).cloned().unwrap_or_default())
    }

    /// Edit a field of the scratch record.
    pub fn set_field_value(&mut self, name: &str, value: impl Into<Value>) -> CursorResult<()> {
        self.apply_source_events();
        self.check_field(name)?;
        self.current.set(name, value);
        self.events.publish(&CursorEvent::FieldChanged {
            name: name.to_string(),
        });
        Ok(())
    }

    // ==================== Persistence ====================

    /// Write the scratch record to the datasource.
    ///
    /// A new record is appended and the cursor moves onto it; an existing
    /// record is replaced in place. Returns the row index written.
    pub fn save(&mut self) -> CursorResult<usize> {
        self.apply_source_events();
        match self.position {
            Position::Bof | Position::Eof => Err(CursorError::NoCurrentRecord),
            Position::New => {
                let record = self.current.clone();
                let index = self.write(|source| source.add(record))?;
                self.loaded = self.current.clone();
                self.position = Position::Row(index);
                debug!(index, "Created record");
                self.events.publish(&CursorEvent::Saved {
                    index,
                    created: true,
                });
                let moved = CursorEvent::Moved {
                    from: Position::New,
                    to: self.position,
                    row_count: self.row_count(),
                };
                self.events.publish(&moved);
                Ok(index)
            }
            Position::Row(index) => {
                let record = self.current.clone();
                self.write(|source| source.replace(index, record))?;
                self.loaded = self.current.clone();
                debug!(index, "Saved record");
                self.events.publish(&CursorEvent::Saved {
                    index,
                    created: false,
                });
                Ok(index)
            }
        }
    }

    /// Delete the current record.
    ///
    /// The cursor stays on the same index, which now holds the next record,
    /// or moves to EOF when the last record was deleted. Deleting an unsaved
    /// new record just abandons it.
    pub fn delete_current(&mut self) -> CursorResult<Position> {
        self.apply_source_events();
        let target = match self.position {
            Position::Bof | Position::Eof => return Err(CursorError::NoCurrentRecord),
            Position::New => Position::Eof,
            Position::Row(index) => {
                self.write(|source| source.remove(index))?;
                debug!(index, "Deleted record");
                if index < self.source.borrow().count() {
                    Position::Row(index)
                } else {
                    Position::Eof
                }
            }
        };

        let loaded = self.load(target)?;
        self.settle(target, loaded);
        Ok(target)
    }

    /// Re-read the current record from the datasource, dropping edits.
    pub fn reload(&mut self) -> CursorResult<()> {
        if let Position::Row(_) = self.position {
            let loaded = self.load(self.position)?;
            self.settle(self.position, loaded);
        }
        Ok(())
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("loaded", &self.loaded)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if let Ok(mut source) = self.source.try_borrow_mut() {
            source.unsubscribe(self.subscription);
        }
    }
}
