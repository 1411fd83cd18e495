use crate::error::Result;
use crate::link::{LinkName, LinkTable, RemoteUrl};
use async_trait::async_trait;

/// A read-only view of a link store.
///
/// Implementations must be safe for concurrent use without external locking.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Returns every stored entry. An empty store yields an empty table.
    async fn list_all(&self) -> Result<LinkTable>;

    /// Looks up the remote URL stored under `name`.
    ///
    /// Returns `None` when no row matches and also when the stored URL is
    /// empty; the two cases are indistinguishable to callers.
    async fn resolve(&self, name: &LinkName) -> Result<Option<RemoteUrl>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new entry. Returns `Err(DuplicateKey)` if `name` is taken.
    ///
    /// The insert is attempted unconditionally and the store's uniqueness
    /// enforcement decides the outcome; existing entries are never overwritten.
    async fn insert(&self, name: &LinkName, url: &RemoteUrl) -> Result<()>;
}
