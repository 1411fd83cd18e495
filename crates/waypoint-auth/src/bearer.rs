use crate::error::{AuthError, Result};
use crate::gate::AuthGate;
use crate::keyset::KeySet;
use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Optional claim checks on top of signature and expiry.
#[derive(Debug, Clone, Default)]
pub struct BearerGateConfig {
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
}

/// Bearer-JWT gate.
///
/// Requires `Authorization: Bearer <token>` and verifies the token against
/// the current snapshot of the remote key set.
#[derive(Debug, Clone)]
pub struct BearerGate {
    keys: Arc<KeySet>,
    config: BearerGateConfig,
}

impl BearerGate {
    pub fn new(keys: Arc<KeySet>, config: BearerGateConfig) -> Self {
        Self { keys, config }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }

    /// Verifies `token` and returns its subject, if any.
    pub fn verify(&self, token: &str) -> Result<Option<String>> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if matches!(
            header.alg,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::InvalidToken(format!(
                "symmetric algorithm {:?} not accepted",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("token has no key id".to_string()))?;

        let snapshot = self.keys.snapshot();
        let jwk = snapshot
            .find(&kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("unknown key id '{kid}'")))?;
        let key = DecodingKey::from_jwk(jwk).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let data = decode::<Claims>(token, &key, &self.validation(header.alg))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(data.claims.sub)
    }
}

#[async_trait]
impl AuthGate for BearerGate {
    async fn authorize(&self, request: &Parts) -> Result<()> {
        let value = match request.headers.get(AUTHORIZATION) {
            Some(value) => value.to_str().map_err(|_| {
                AuthError::InvalidToken("authorization header is not visible ascii".to_string())
            })?,
            None => "",
        };

        if value.is_empty() {
            return Err(AuthError::MissingAuthorization);
        }

        let token = bearer_token(value)
            .ok_or_else(|| AuthError::InvalidToken("expected a bearer token".to_string()))?;

        let subject = self.verify(token)?;
        debug!(subject = subject.as_deref().unwrap_or("-"), "bearer token accepted");
        Ok(())
    }
}

/// Extracts the credentials of a `Bearer` authorization value. The scheme
/// is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
