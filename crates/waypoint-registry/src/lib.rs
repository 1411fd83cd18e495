//! Link registry service.
//!
//! [`RegistryService`] validates request shape, delegates to a
//! [`Repository`](waypoint_core::Repository) and maps store failures to
//! [`RegistryError`] outcomes the HTTP front can render.

pub mod error;
pub mod registry;
pub mod service;

pub use error::RegistryError;
pub use registry::{EntryPayload, Registry};
pub use service::RegistryService;
