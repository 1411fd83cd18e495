use thiserror::Error;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised by a link store.
///
/// `Unavailable`, `Timeout` and `Query` all mean the store could not serve
/// the request; callers that don't care about the difference can use
/// [`StorageError::is_unavailable`].
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("entry already exists: {0}")]
    DuplicateKey(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StorageError::Unavailable(_) | StorageError::Timeout(_) | StorageError::Query(_)
        )
    }
}
