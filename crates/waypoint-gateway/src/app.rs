use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use waypoint_auth::{SessionGate, SESSION_COOKIE};

use crate::handlers::{
    auth_callback_handler, create_entry_handler, health_handler, list_entries_handler,
    redirect_handler, sign_in_handler,
};
use crate::middleware::require_auth;
use crate::state::AppState;

pub struct App {}

impl App {
    /// Routes shared by every deployment. The entry routes run behind the
    /// state's auth gate; the redirect routes are public.
    pub fn router(state: AppState) -> Router {
        Self::routes(state).layer(TraceLayer::new_for_http())
    }

    /// [`App::router`] plus the sign-in flow, with every route inside the
    /// session layer so the gate can read the caller's session.
    pub fn session_router(state: AppState, gate: Arc<SessionGate>, secure_cookie: bool) -> Router {
        let sessions = SessionManagerLayer::new(MemoryStore::default())
            .with_name(SESSION_COOKIE)
            .with_same_site(SameSite::Lax)
            .with_secure(secure_cookie);

        let sign_in = Router::new()
            .route("/sign-in", get(sign_in_handler))
            .route("/auth-callback", get(auth_callback_handler))
            .with_state(gate);

        Self::routes(state)
            .merge(sign_in)
            .layer(sessions)
            .layer(TraceLayer::new_for_http())
    }

    fn routes(state: AppState) -> Router {
        let api = Router::new()
            .route(
                "/entries",
                get(list_entries_handler).post(create_entry_handler),
            )
            .route_layer(from_fn_with_state(state.clone(), require_auth))
            .route("/{name}/", get(redirect_handler));

        Router::new()
            .route("/health", get(health_handler))
            .route("/{name}", get(redirect_handler))
            .nest("/api/v1", api)
            .with_state(state)
    }
}
