//! Error types for cursor operations.

use freebase_core::DatasourceError;
use thiserror::Error;

use crate::position::Position;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Errors that can occur while navigating or editing through a cursor.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The requested move is structurally impossible.
    #[error("Illegal move from {from}: {reason}")]
    IllegalMove { from: Position, reason: String },

    /// Field access while positioned at BOF or EOF.
    #[error("No current record")]
    NoCurrentRecord,

    /// Field name not in the datasource's column set.
    #[error("No such field: {name}")]
    NoSuchField { name: String },

    /// The underlying datasource rejected the operation.
    #[error(transparent)]
    Datasource(#[from] DatasourceError),
}

impl CursorError {
    /// Create an illegal move error.
    pub fn illegal_move(from: Position, reason: impl Into<String>) -> Self {
        Self::IllegalMove {
            from,
            reason: reason.into(),
        }
    }

    /// Check whether this is an illegal navigation.
    pub fn is_illegal_move(&self) -> bool {
        matches!(self, Self::IllegalMove { .. })
    }
}
