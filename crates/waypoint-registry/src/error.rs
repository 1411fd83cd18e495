use thiserror::Error;
use waypoint_core::StorageError;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("entry already exists: {0}")]
    DuplicateKey(String),
    #[error("entry not found: {0}")]
    NotFound(String),
    #[error("listing failed: {0}")]
    ListingFailed(#[source] StorageError),
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for RegistryError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::DuplicateKey(name) => Self::DuplicateKey(name),
            other => Self::Storage(other),
        }
    }
}
