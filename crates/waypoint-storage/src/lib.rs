//! Link store adapters.
//!
//! [`PostgresRepository`] is the production store; [`InMemoryRepository`]
//! implements the same contract for tests and embedding.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;
pub use waypoint_core::{ReadRepository, Repository, StorageError};
