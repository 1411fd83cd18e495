use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

/// Runs the configured [`AuthGate`](waypoint_auth::AuthGate) and only calls
/// the wrapped handler when it admits the request.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let (parts, body) = request.into_parts();

    state.gate().authorize(&parts).await.map_err(AppError::Auth)?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
