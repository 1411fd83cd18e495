use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use waypoint_core::LinkName;

/// Answers with a permanent (301) redirect to the stored URL.
pub async fn redirect_handler(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let url = state
        .registry()
        .resolve(&LinkName::new(name))
        .await
        .map_err(AppError::Resolve)?;

    let location = HeaderValue::try_from(url.as_str())
        .map_err(|e| AppError::InvalidRedirect(format!("{url}: {e}")))?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}
