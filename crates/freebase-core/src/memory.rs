//! In-memory datasource.

use std::fmt;
use std::path::Path;

use tracing::{debug, trace};

use crate::datasource::{Datasource, RowEvent, RowEventKind};
use crate::error::{DatasourceError, DatasourceResult};
use crate::notifier::{ChangeNotifier, SubscriptionId};
use crate::record::{Column, Record, infer_columns};
use crate::value::Value;

/// A datasource backed by a vector of records.
pub struct MemoryDatasource {
    columns: Vec<Column>,
    rows: Vec<Record>,
    count_known: bool,
    notifier: ChangeNotifier<RowEvent>,
}

impl MemoryDatasource {
    /// Create an empty datasource with the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            count_known: true,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Create a datasource holding `rows`.
    pub fn with_rows(columns: Vec<Column>, rows: Vec<Record>) -> Self {
        Self {
            rows,
            ..Self::new(columns)
        }
    }

    /// Create a datasource from records, inferring the column set.
    pub fn from_records(rows: Vec<Record>) -> Self {
        let columns = infer_columns(&rows);
        Self::with_rows(columns, rows)
    }

    /// Parse a JSON document set.
    ///
    /// Accepts either an array of objects or a view result of the form
    /// `{"rows": [{"doc": {...}}, {"value": {...}}]}`. Rows that are not
    /// objects are rejected.
    pub fn from_json_str(json: &str) -> DatasourceResult<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        let items = match parsed {
            serde_json::Value::Array(items) => items,
            serde_json::Value::Object(mut map) => match map.remove("rows") {
                Some(serde_json::Value::Array(rows)) => rows
                    .into_iter()
                    .map(|row| match row {
                        serde_json::Value::Object(mut row) => row
                            .remove("doc")
                            .or_else(|| row.remove("value"))
                            .unwrap_or(serde_json::Value::Object(row)),
                        other => other,
                    })
                    .collect(),
                _ => {
                    return Err(DatasourceError::Load {
                        message: "expected an array or an object with a \"rows\" array".into(),
                    });
                }
            },
            _ => {
                return Err(DatasourceError::Load {
                    message: "expected an array or an object with a \"rows\" array".into(),
                });
            }
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match Value::from(item) {
                Value::Object(map) => Ok(Record::from(map)),
                _ => Err(DatasourceError::Load {
                    message: format!("row {index} is not an object"),
                }),
            })
            .collect::<DatasourceResult<Vec<_>>>()?;

        debug!(rows = rows.len(), "Loaded records from JSON");
        Ok(Self::from_records(rows))
    }

    /// Load a JSON document set from a file.
    pub fn load_json(path: impl AsRef<Path>) -> DatasourceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Mark the row count as unknown (or known again).
    ///
    /// While unknown, [`Datasource::count_hint`] returns `None`, the way a
    /// paged backend behaves before its total arrives.
    pub fn set_count_known(&mut self, known: bool) {
        self.count_known = known;
    }

    /// Replace the column set.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    /// Replace every row at once, firing a single row-count event.
    pub fn reset(&mut self, rows: Vec<Record>) {
        self.rows = rows;
        debug!(count = self.rows.len(), "Datasource reset");
        let event = RowEvent::count_changed(self.rows.len());
        self.notifier.publish(&event);
    }

    /// Remove every row.
    pub fn clear(&mut self) {
        self.reset(Vec::new());
    }

    /// Serialize all rows as a JSON array.
    pub fn to_json(&self) -> DatasourceResult<String> {
        Ok(serde_json::to_string_pretty(&self.rows)?)
    }

    fn check_index(&self, index: usize) -> DatasourceResult<()> {
        if index < self.rows.len() {
            Ok(())
        } else {
            Err(DatasourceError::no_such_record(index, self.rows.len()))
        }
    }

    fn fire(&mut self, kind: RowEventKind, index: usize) {
        let event = RowEvent::single(kind, index, self.rows.len());
        trace!(?kind, index, count = event.row_count, "Row event");
        self.notifier.publish(&event);
    }
}

impl Datasource for MemoryDatasource {
    fn columns(&self) -> Vec<Column> {
        self.columns.clone()
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn count_hint(&self) -> Option<usize> {
        self.count_known.then_some(self.rows.len())
    }

    fn get(&self, index: usize) -> DatasourceResult<Record> {
        self.check_index(index)?;
        Ok(self.rows[index].clone())
    }

    fn insert(&mut self, index: usize, record: Record) -> DatasourceResult<()> {
        if index > self.rows.len() {
            return Err(DatasourceError::no_such_record(index, self.rows.len()));
        }
        self.rows.insert(index, record);
        self.fire(RowEventKind::RowsInsert, index);
        Ok(())
    }

    fn replace(&mut self, index: usize, record: Record) -> DatasourceResult<()> {
        self.check_index(index)?;
        self.rows[index] = record;
        self.fire(RowEventKind::RowsUpdate, index);
        Ok(())
    }

    fn remove(&mut self, index: usize) -> DatasourceResult<Record> {
        self.check_index(index)?;
        let removed = self.rows.remove(index);
        self.fire(RowEventKind::RowsDelete, index);
        Ok(removed)
    }

    fn subscribe(&mut self, listener: Box<dyn FnMut(&RowEvent)>) -> SubscriptionId {
        self.notifier.subscribe_boxed(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}

impl Default for MemoryDatasource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for MemoryDatasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDatasource")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("count_known", &self.count_known)
            .finish()
    }
}
