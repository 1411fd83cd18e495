use crate::error::{AuthError, Result};
use arc_swap::ArcSwap;
use jsonwebtoken::jwk::JwkSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// The signing keys published at a remote JWKS URL.
///
/// The current set is swapped atomically on every successful refresh;
/// readers always get the latest complete snapshot without waiting for a
/// refresh in progress. A failed refresh keeps the previous set.
#[derive(Debug)]
pub struct KeySet {
    url: String,
    http: reqwest::Client,
    current: ArcSwap<JwkSet>,
}

impl KeySet {
    /// Fetches the key set once and returns the loaded cache.
    ///
    /// Fails if the initial fetch fails; there is no key set to fall back to.
    pub async fn load(url: impl Into<String>) -> Result<Arc<Self>> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::load_with_client(url, http).await
    }

    pub async fn load_with_client(url: impl Into<String>, http: reqwest::Client) -> Result<Arc<Self>> {
        let url = url.into();
        let keys = fetch(&http, &url).await?;

        Ok(Arc::new(Self {
            url,
            http,
            current: ArcSwap::from_pointee(keys),
        }))
    }

    /// Returns the most recently fetched key set.
    pub fn snapshot(&self) -> Arc<JwkSet> {
        self.current.load_full()
    }

    /// Fetches the key set now and publishes it on success.
    pub async fn refresh(&self) -> Result<()> {
        let keys = fetch(&self.http, &self.url).await?;
        debug!(keys = keys.keys.len(), url = %self.url, "refreshed key set");
        self.current.store(Arc::new(keys));
        Ok(())
    }

    /// Spawns a task refreshing the key set every `period`.
    ///
    /// The first refresh happens one `period` after the call, since
    /// [`KeySet::load`] already fetched the set.
    pub fn spawn_refresh(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let keys = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = keys.refresh().await {
                    warn!(error = %e, url = %keys.url, "key set refresh failed, keeping previous keys");
                }
            }
        })
    }
}

async fn fetch(http: &reqwest::Client, url: &str) -> Result<JwkSet> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| AuthError::KeySet(e.to_string()))?
        .error_for_status()
        .map_err(|e| AuthError::KeySet(e.to_string()))?;

    response
        .json::<JwkSet>()
        .await
        .map_err(|e| AuthError::KeySet(format!("invalid key set: {e}")))
}
