use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// Body of every JSON response.
///
/// `error` is empty on success; on failure `data` is `null`, or an empty
/// object for listing failures.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub error: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            error: String::new(),
        }
    }
}

impl Envelope<serde_json::Value> {
    pub fn failure(data: serde_json::Value, message: impl Into<String>) -> Self {
        Self {
            data,
            error: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Indented JSON with an explicit status.
pub struct PrettyJson<T>(pub StatusCode, pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.1) {
            Ok(body) => (
                self.0,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "cannot serialize response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
