//! Error types for the playlog query service.

use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Failed to (de)serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record store entry: {0}")]
    Corrupt(String),
}

/// Errors reported to callers of the query service.
///
/// Record-level visibility is never an error: records the caller may not see
/// are dropped from the result set instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Malformed query id: {0}")]
    MalformedQueryToken(String),

    #[error("Unsupported aggregation: {0}")]
    UnsupportedAggregationKind(String),

    #[error("Invalid sort: {0}")]
    InvalidSort(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Value at '{key}' in record {record} is not numeric")]
    NonNumericValue { key: String, record: String },

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// True for failures caused by the request itself (input or authorization),
    /// as opposed to failures of the stored data or the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::MalformedFilter(_)
                | ApiError::MalformedQueryToken(_)
                | ApiError::UnsupportedAggregationKind(_)
                | ApiError::InvalidSort(_)
                | ApiError::Unauthorized(_)
                | ApiError::Forbidden(_)
                | ApiError::NotFound(_)
                | ApiError::NonNumericValue { .. }
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
