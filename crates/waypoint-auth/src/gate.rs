use crate::error::Result;
use async_trait::async_trait;
use axum::http::request::Parts;

/// A pre-request check guarding the listing and creation routes.
///
/// `Ok(())` lets the request through unchanged. Any `Err` must stop the
/// request before a registry operation runs.
#[async_trait]
pub trait AuthGate: Send + Sync + 'static {
    async fn authorize(&self, request: &Parts) -> Result<()>;
}
