//! Core types and traits for the Waypoint link registry.
//!
//! This crate provides the link entry model and the repository contract
//! shared by the storage adapters, the registry service and the gateway.

pub mod error;
pub mod link;
pub mod repository;

pub use error::StorageError;
pub use link::{LinkEntry, LinkName, LinkTable, RemoteUrl};
pub use repository::{ReadRepository, Repository};
