//! Records and column descriptors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Describes one column of a datasource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Field name in the record.
    pub name: String,
    /// Display text for headers.
    pub caption: String,
}

impl Column {
    /// Create a column whose caption is its name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            caption: name.clone(),
            name,
        }
    }

    /// Create a column with an explicit caption.
    pub fn with_caption(name: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
        }
    }
}

/// A single record: field name to value, in field insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set a field value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Remove a field, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    /// Check if a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Iterate over field names in order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Shallow, per-field loose comparison.
    ///
    /// Two records are loosely equal when they hold the same field set and
    /// every field value is [`Value::loose_eq`] to its counterpart.
    pub fn loose_eq(&self, other: &Record) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.loose_eq(o)))
    }

    /// Names of the fields that differ from `other`, in this record's order
    /// followed by fields only present in `other`.
    pub fn changed_fields(&self, other: &Record) -> Vec<String> {
        let mut changed: Vec<String> = self
            .iter()
            .filter(|(k, v)| !other.get(k).is_some_and(|o| v.loose_eq(o)))
            .map(|(k, _)| k.clone())
            .collect();
        changed.extend(other.names().filter(|k| !self.contains(k)).cloned());
        changed
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<IndexMap<String, Value>> for Record {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Derive a column set from the union of record fields, in first-seen order.
pub fn infer_columns<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<Column> {
    let mut names: IndexMap<&str, ()> = IndexMap::new();
    for record in records {
        for name in record.names() {
            names.entry(name.as_str()).or_insert(());
        }
    }
    names.into_keys().map(Column::new).collect()
}
