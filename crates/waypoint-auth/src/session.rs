use crate::error::{AuthError, Result};
use crate::gate::AuthGate;
use crate::identity::IdentityProvider;
use async_trait::async_trait;
use axum::http::request::Parts;
use reqwest::Url;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "logto-session";

const CALLBACK_PATH: &str = "auth-callback";
const STATE_KEY: &str = "sign_in_state";
const ID_TOKEN_KEY: &str = "id_token";

/// Query parameters the identity provider appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignInCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Session-cookie gate.
///
/// A session is authenticated once the sign-in callback has stored an id
/// token in it. Sessions themselves are managed by the `tower-sessions`
/// layer, which must wrap every route this gate protects.
#[derive(Debug, Clone)]
pub struct SessionGate {
    provider: IdentityProvider,
    base_url: String,
}

impl SessionGate {
    /// `base_url` is the public address of this service, used to build the
    /// callback URL registered at the provider.
    pub fn new(provider: IdentityProvider, base_url: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
        }
    }

    fn redirect_uri(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), CALLBACK_PATH)
    }

    /// Whether `session` carries an identity from a completed sign-in.
    pub async fn is_authenticated(&self, session: &Session) -> Result<bool> {
        let token: Option<String> = session.get(ID_TOKEN_KEY).await?;
        Ok(token.is_some_and(|token| !token.is_empty()))
    }

    /// Starts a sign-in: remembers a fresh `state` in the session and returns
    /// the provider URL to redirect the browser to.
    pub async fn begin_sign_in(&self, session: &Session) -> Result<Url> {
        let state = Uuid::new_v4().simple().to_string();
        session.insert(STATE_KEY, &state).await?;
        self.provider.authorization_url(&self.redirect_uri(), &state)
    }

    /// Completes a sign-in from the provider's callback parameters.
    pub async fn complete_sign_in(&self, session: &Session, callback: SignInCallback) -> Result<()> {
        let expected: Option<String> = session.remove(STATE_KEY).await?;

        if let Some(error) = callback.error {
            let description = callback.error_description.unwrap_or_default();
            return Err(AuthError::SignIn(format!("{error} {description}").trim().to_string()));
        }

        match (expected, callback.state) {
            (Some(expected), Some(state)) if expected == state => {}
            _ => return Err(AuthError::SignIn("state mismatch".to_string())),
        }

        let code = callback
            .code
            .ok_or_else(|| AuthError::SignIn("missing authorization code".to_string()))?;

        let tokens = self.provider.exchange_code(&code, &self.redirect_uri()).await?;

        session.cycle_id().await?;
        session.insert(ID_TOKEN_KEY, tokens.id_token).await?;
        info!("sign-in completed");
        Ok(())
    }
}

#[async_trait]
impl AuthGate for SessionGate {
    async fn authorize(&self, request: &Parts) -> Result<()> {
        let session = request
            .extensions
            .get::<Session>()
            .ok_or_else(|| AuthError::Session("no session attached to request".to_string()))?;

        if self.is_authenticated(session).await? {
            Ok(())
        } else {
            debug!(uri = %request.uri, "request has no signed-in session");
            Err(AuthError::NotSignedIn)
        }
    }
}
