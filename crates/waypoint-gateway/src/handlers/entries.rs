use crate::error::{AppError, Result};
use crate::model::{Envelope, PrettyJson};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use waypoint_core::LinkTable;
use waypoint_registry::EntryPayload;

pub async fn list_entries_handler(
    State(state): State<AppState>,
) -> Result<PrettyJson<Envelope<LinkTable>>> {
    let entries = state
        .registry()
        .list_entries()
        .await
        .map_err(AppError::List)?;

    Ok(PrettyJson(StatusCode::OK, Envelope::ok(entries)))
}

/// Accepts a JSON object with exactly one `name: url` pair. The body is
/// parsed regardless of its declared content type.
pub async fn create_entry_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<PrettyJson<Envelope<LinkTable>>> {
    let payload: EntryPayload =
        serde_json::from_slice(&body).map_err(|e| AppError::MalformedBody(e.to_string()))?;

    let entry = state
        .registry()
        .create_entry(payload)
        .await
        .map_err(AppError::Create)?;

    Ok(PrettyJson(StatusCode::CREATED, Envelope::ok(entry.into_table())))
}
