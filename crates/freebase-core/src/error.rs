//! Error types for datasource operations.

use thiserror::Error;

/// Result type for datasource operations.
pub type DatasourceResult<T> = Result<T, DatasourceError>;

/// Errors that can occur while reading or mutating a datasource.
#[derive(Debug, Error)]
pub enum DatasourceError {
    /// Row index outside the valid range for the attempted operation.
    #[error("No such record: index {index} (row count {count})")]
    NoSuchRecord { index: usize, count: usize },

    /// The input could not be turned into records.
    #[error("Failed to load records: {message}")]
    Load { message: String },

    /// JSON parse error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatasourceError {
    /// Create a no-such-record error.
    pub fn no_such_record(index: usize, count: usize) -> Self {
        Self::NoSuchRecord { index, count }
    }

    /// Check whether this is an out-of-range access.
    pub fn is_no_such_record(&self) -> bool {
        matches!(self, Self::NoSuchRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_such_record_message() {
        let err = DatasourceError::no_such_record(7, 3);
        assert!(err.is_no_such_record());
        assert!(err.to_string().contains("index 7"));
        assert!(err.to_string().contains("row count 3"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DatasourceError = json_err.into();
        assert!(matches!(err, DatasourceError::Json(_)));
        assert!(!err.is_no_such_record());
    }
}
