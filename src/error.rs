//! Error types used across Calla.

use thiserror::Error;

/// A specialized `Result` type for Calla operations.
pub type Result<T> = std::result::Result<T, CallaError>;

/// The error type for all Calla operations.
#[derive(Debug, Error)]
pub enum CallaError {
    /// An invalid argument was passed to an API.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Parser or engine configuration rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The search query was empty or otherwise unusable.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A persistent store read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The cache backend failed. Call sites treat this as a cache miss.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Serializing or deserializing a cached value failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O operation failed (e.g. reading a stopword file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CallaError {
    /// Create an invalid argument error.
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        CallaError::InvalidArgument(message.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        CallaError::InvalidConfiguration(message.into())
    }

    /// Create an invalid query error.
    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        CallaError::InvalidQuery(message.into())
    }

    /// Create a storage error.
    pub fn storage<S: Into<String>>(message: S) -> Self {
        CallaError::Storage(message.into())
    }

    /// Create a cache error.
    pub fn cache<S: Into<String>>(message: S) -> Self {
        CallaError::Cache(message.into())
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        CallaError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CallaError::invalid_query("query must not be empty");
        assert_eq!(err.to_string(), "Invalid query: query must not be empty");

        let err = CallaError::invalid_config("max cache size must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max cache size must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CallaError = io.into();
        assert!(matches!(err, CallaError::Io(_)));
    }
}
