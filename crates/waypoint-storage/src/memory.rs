use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use waypoint_core::error::{Result, StorageError};
use waypoint_core::repository::{ReadRepository, Repository};
use waypoint_core::{LinkName, LinkTable, RemoteUrl};

/// In-memory implementation of the repository contract using DashMap.
///
/// Inserts go through the shard-locked entry API, so two concurrent inserts
/// of the same name cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<LinkName, RemoteUrl>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn list_all(&self) -> Result<LinkTable> {
        Ok(self
            .storage
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn resolve(&self, name: &LinkName) -> Result<Option<RemoteUrl>> {
        Ok(self
            .storage
            .get(name)
            .and_then(|url| RemoteUrl::non_empty(url.as_str())))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, name: &LinkName, url: &RemoteUrl) -> Result<()> {
        match self.storage.entry(name.clone()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateKey(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(url.clone());
                Ok(())
            }
        }
    }
}
