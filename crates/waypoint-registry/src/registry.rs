use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use waypoint_core::{LinkEntry, LinkName, LinkTable, RemoteUrl};

/// A create request as decoded from the wire: any number of `name -> url`
/// pairs. Only payloads with exactly one pair are accepted.
pub type EntryPayload = BTreeMap<String, String>;

#[async_trait]
pub trait Registry: Send + Sync + 'static {
    /// Returns every registered entry.
    async fn list_entries(&self) -> Result<LinkTable>;

    /// Registers the single entry carried by `payload` and returns it.
    async fn create_entry(&self, payload: EntryPayload) -> Result<LinkEntry>;

    /// Resolves `name` to the URL the caller should be redirected to.
    async fn resolve(&self, name: &LinkName) -> Result<RemoteUrl>;
}
