use crate::error::{RegistryError, Result};
use crate::registry::{EntryPayload, Registry};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, trace};
use waypoint_core::{LinkEntry, LinkName, LinkTable, RemoteUrl, Repository};

/// A concrete implementation of the [`Registry`] trait.
///
/// The service holds no state of its own; the repository is the only source
/// of truth, and entries are never updated or removed through it.
#[derive(Debug)]
pub struct RegistryService<R> {
    repository: Arc<R>,
}

impl<R> Clone for RegistryService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Repository> RegistryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Extracts the only pair of a create payload.
    fn single_entry(payload: EntryPayload) -> Result<LinkEntry> {
        if payload.len() != 1 {
            return Err(RegistryError::MalformedRequest(format!(
                "payload must contain exactly one entry, got {}",
                payload.len()
            )));
        }

        let (name, url) = payload
            .into_iter()
            .next()
            .ok_or_else(|| RegistryError::MalformedRequest("payload is empty".to_string()))?;
        Ok(LinkEntry::new(name, url))
    }
}

#[async_trait]
impl<R: Repository> Registry for RegistryService<R> {
    async fn list_entries(&self) -> Result<LinkTable> {
        self.repository
            .list_all()
            .await
            .map_err(RegistryError::ListingFailed)
    }

    async fn create_entry(&self, payload: EntryPayload) -> Result<LinkEntry> {
        let entry = Self::single_entry(payload)?;

        self.repository.insert(&entry.name, &entry.url).await?;

        debug!(name = %entry.name, url = %entry.url, "registered link");
        Ok(entry)
    }

    async fn resolve(&self, name: &LinkName) -> Result<RemoteUrl> {
        trace!(name = %name, "resolving link");

        match self.repository.resolve(name).await? {
            Some(url) => {
                debug!(name = %name, url = %url, "resolved link");
                Ok(url)
            }
            None => Err(RegistryError::NotFound(name.to_string())),
        }
    }
}
