//! Core types and traits for freebase.
//!
//! This crate provides the data model shared by the cursor, the grid
//! viewport and the terminal front end: dynamically typed values, records,
//! column descriptors, the [`Datasource`] contract with its row events, and
//! the [`ChangeNotifier`] used by every component to publish changes.

mod config;
mod datasource;
mod error;
mod memory;
mod notifier;
mod record;
mod value;

pub use config::{GridConfig, GridConfigBuilder};
pub use datasource::{
    Datasource, RowEvent, RowEventKind, SharedDatasource, binary_search, insert_sorted, shared,
};
pub use error::{DatasourceError, DatasourceResult};
pub use memory::MemoryDatasource;
pub use notifier::{Cancelable, ChangeNotifier, SubscriptionId};
pub use record::{Column, Record, infer_columns};
pub use value::Value;
