//! Error types shared across the cache core.
//!
//! `ApiError` (in [`crate::api`]) covers the remote side. `StorageError`
//! covers the local store, and `CacheError` is what the repository hands
//! back to its callers.

use thiserror::Error;

use crate::api::ApiError;

/// Errors raised by the local entity store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

/// Failure of a public repository operation.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] ApiError),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl CacheError {
    /// True when the remote side failed and the local store was left alone.
    pub fn is_fetch(&self) -> bool {
        matches!(self, CacheError::Fetch(_))
    }
}

/// Result type for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type for repository operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::QueryFailed("disk I/O error".to_string());
        assert_eq!(err.to_string(), "Query failed: disk I/O error");
    }

    #[test]
    fn test_cache_error_wraps_fetch_error() {
        let err: CacheError = ApiError::RateLimited.into();
        assert!(err.is_fetch());
        assert!(err.to_string().starts_with("Fetch failed:"));
    }

    #[test]
    fn test_cache_error_wraps_storage_error() {
        let err: CacheError = StorageError::ConnectionFailed("closed".to_string()).into();
        assert!(!err.is_fetch());
        assert_eq!(err.to_string(), "Storage failed: Connection failed: closed");
    }
}
