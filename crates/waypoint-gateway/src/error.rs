use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, warn};
use waypoint_auth::AuthError;
use waypoint_registry::RegistryError;

use crate::model::Envelope;

pub type Result<T> = std::result::Result<T, AppError>;

/// Request failures, tagged with the operation that failed so the same
/// store error can be reported with the matching message.
#[derive(Debug)]
pub enum AppError {
    /// The create body is not a JSON object of strings.
    MalformedBody(String),
    List(RegistryError),
    Create(RegistryError),
    Resolve(RegistryError),
    /// The auth gate refused or could not decide.
    Auth(AuthError),
    /// The sign-in or callback step against the identity provider failed.
    SignIn(AuthError),
    /// The stored URL cannot be sent as a `Location` header.
    InvalidRedirect(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, Value, &'static str) {
        match self {
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, Value::Null, "parsing request data failed"),
            AppError::List(RegistryError::ListingFailed(e)) if !e.is_unavailable() => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({}), "cannot parse entries from db")
            }
            AppError::List(_) => (StatusCode::INTERNAL_SERVER_ERROR, json!({}), "cannot get entries from db"),
            AppError::Create(RegistryError::MalformedRequest(_)) => {
                (StatusCode::BAD_REQUEST, Value::Null, "json must contain one element")
            }
            AppError::Create(RegistryError::DuplicateKey(_)) => {
                (StatusCode::BAD_REQUEST, Value::Null, "entry with name already exist")
            }
            AppError::Create(_) => (StatusCode::INTERNAL_SERVER_ERROR, Value::Null, "cannot push entry to db"),
            AppError::Resolve(RegistryError::NotFound(_)) => (StatusCode::NOT_FOUND, Value::Null, "entry not found"),
            AppError::Resolve(_) => (StatusCode::INTERNAL_SERVER_ERROR, Value::Null, "cannot get entry from db"),
            AppError::Auth(e) if e.is_rejection() => (StatusCode::FORBIDDEN, Value::Null, rejection_message(e)),
            AppError::Auth(_) => (StatusCode::INTERNAL_SERVER_ERROR, Value::Null, "cannot authenticate request"),
            AppError::SignIn(_) => (StatusCode::INTERNAL_SERVER_ERROR, Value::Null, "sign-in failed"),
            AppError::InvalidRedirect(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Value::Null, "cannot redirect to stored url")
            }
        }
    }

    fn cause(&self) -> String {
        match self {
            AppError::MalformedBody(reason) | AppError::InvalidRedirect(reason) => reason.clone(),
            AppError::List(e) | AppError::Create(e) | AppError::Resolve(e) => e.to_string(),
            AppError::Auth(e) | AppError::SignIn(e) => e.to_string(),
        }
    }
}

fn rejection_message(error: &AuthError) -> &'static str {
    match error {
        AuthError::NotSignedIn => "client is not authenticated via logto",
        AuthError::MissingAuthorization => "Authorization header is empty",
        _ => "invalid authorization token",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, data, message) = self.parts();
        let cause = self.cause();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %cause, "{message}");
        } else {
            warn!(status = status.as_u16(), error = %cause, "{message}");
        }

        // The identity-provider steps are browser redirects, not API calls.
        if let AppError::SignIn(e) = self {
            return (status, e.to_string()).into_response();
        }

        (status, Json(Envelope::failure(data, message))).into_response()
    }
}
