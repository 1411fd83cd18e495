use crate::error::{AppError, Result};
use axum::extract::{Query, State};
use axum::response::Redirect;
use std::sync::Arc;
use tower_sessions::Session;
use waypoint_auth::{SessionGate, SignInCallback};

/// Where the browser lands after a completed sign-in.
const AFTER_SIGN_IN: &str = "/admin";

pub async fn sign_in_handler(
    State(gate): State<Arc<SessionGate>>,
    session: Session,
) -> Result<Redirect> {
    let url = gate.begin_sign_in(&session).await.map_err(AppError::SignIn)?;
    Ok(Redirect::temporary(url.as_str()))
}

pub async fn auth_callback_handler(
    State(gate): State<Arc<SessionGate>>,
    session: Session,
    Query(callback): Query<SignInCallback>,
) -> Result<Redirect> {
    gate.complete_sign_in(&session, callback)
        .await
        .map_err(AppError::SignIn)?;
    Ok(Redirect::temporary(AFTER_SIGN_IN))
}
