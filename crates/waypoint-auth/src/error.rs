use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("client is not authenticated via logto")]
    NotSignedIn,
    #[error("Authorization header is empty")]
    MissingAuthorization,
    #[error("invalid authorization token: {0}")]
    InvalidToken(String),
    #[error("sign-in failed: {0}")]
    SignIn(String),
    #[error("identity provider request failed: {0}")]
    IdentityProvider(String),
    #[error("key set unavailable: {0}")]
    KeySet(String),
    #[error("session store failed: {0}")]
    Session(String),
}

impl AuthError {
    /// Whether the error means the caller failed authentication, as opposed
    /// to the gate being unable to decide.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::NotSignedIn | AuthError::MissingAuthorization | AuthError::InvalidToken(_)
        )
    }
}

impl From<tower_sessions::session::Error> for AuthError {
    fn from(value: tower_sessions::session::Error) -> Self {
        AuthError::Session(value.to_string())
    }
}
