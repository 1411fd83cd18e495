//! HTTP front of the Waypoint link registry.
//!
//! [`App`] binds the public redirect route and the gated `/api/v1/entries`
//! routes to a [`Registry`](waypoint_registry::Registry), with one
//! [`AuthGate`](waypoint_auth::AuthGate) deciding access to the latter.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
