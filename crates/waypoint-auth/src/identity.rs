use crate::error::{AuthError, Result};
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const AUTHORIZE_PATH: &str = "oidc/auth";
const TOKEN_PATH: &str = "oidc/token";
const SCOPES: &str = "openid offline_access profile";

/// Credentials of this application at the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Base URL of the provider, e.g. `https://id.bksp.in/`.
    pub endpoint: String,
    pub app_id: String,
    pub app_secret: String,
}

/// The part of the token endpoint's answer a sign-in keeps.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub id_token: String,
}

/// Client for the provider's authorization-code flow.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    config: IdentityProviderConfig,
    http: reqwest::Client,
}

impl IdentityProvider {
    pub fn new(config: IdentityProviderConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(config, http)
    }

    pub fn with_client(config: IdentityProviderConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let mut base = self.config.endpoint.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Url::parse(&base)
            .and_then(|url| url.join(path))
            .map_err(|e| {
                AuthError::IdentityProvider(format!(
                    "invalid endpoint '{}': {e}",
                    self.config.endpoint
                ))
            })
    }

    /// Builds the URL the browser is sent to in order to sign in.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        let mut url = self.endpoint_url(AUTHORIZE_PATH)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.app_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        Ok(url)
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse> {
        let url = self.endpoint_url(TOKEN_PATH)?;
        debug!(token_url = %url, "exchanging authorization code");

        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.app_id, Some(&self.config.app_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.config.app_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?;

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::IdentityProvider(format!("invalid token response: {e}")))
    }
}
