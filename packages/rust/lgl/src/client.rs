//! Paced REST client for the Little Green Light API.
//!
//! Every call is joined onto a fixed base URL, carries the bearer token, and
//! is followed by a fixed pause whether it succeeded or not. This is the only
//! place the LGL rate limit is enforced; callers issue requests back to back.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use contactaudit_shared::{AuditError, LglConfig, Result, resolve_credential};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.littlegreenlight.com/api/v1/";

/// Pause after each call.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1500);

/// User-Agent string for LGL requests.
const USER_AGENT: &str = concat!("contactaudit/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// LglApi
// ---------------------------------------------------------------------------

/// Read access to the LGL API, keyed by paths relative to the API root.
///
/// [`LglClient`] is the real implementation; the walker and normalizer only
/// depend on this trait.
pub trait LglApi {
    /// GET `path` and return the parsed JSON body.
    fn get(&self, path: &str) -> impl Future<Output = Result<Value>> + Send;

    /// GET `path` and deserialize the body into `T`.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<T>> + Send
    where
        Self: Sync,
    {
        async move {
            let body = self.get(path).await?;
            serde_json::from_value(body)
                .map_err(|e| AuditError::parse(format!("LGL response for '{path}': {e}")))
        }
    }
}

// ---------------------------------------------------------------------------
// LglClient
// ---------------------------------------------------------------------------

pub struct LglClient {
    client: Client,
    base_url: Url,
    token: String,
    delay: Duration,
}

impl std::fmt::Debug for LglClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LglClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("delay", &self.delay)
            .finish()
    }
}

impl LglClient {
    /// Create a client against `base_url` with the default pacing.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::build(base_url, token.into(), DEFAULT_REQUEST_DELAY, 30)
    }

    /// Create a client from config. The token is `explicit_token` if given,
    /// otherwise the env var named by `config.token_env`.
    pub fn from_config(config: &LglConfig, explicit_token: Option<&str>) -> Result<Self> {
        let token = resolve_credential(explicit_token, &config.token_env, "LGL API token")?;
        Self::build(
            &config.base_url,
            token,
            Duration::from_millis(config.request_delay_ms),
            config.timeout_secs,
        )
    }

    fn build(base_url: &str, token: String, delay: Duration, timeout_secs: u64) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| AuditError::config(format!("invalid LGL base URL '{base}': {e}")))?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AuditError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token,
            delay,
        })
    }

    /// Override the post-call pause.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a relative API path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AuditError::config(format!("invalid LGL path '{path}': {e}")))
    }

    async fn send(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        debug!(%url, "LGL GET");

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AuditError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, status = status.as_u16(), "LGL call failed");
            return Err(AuditError::Http {
                service: "LGL",
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuditError::Network(format!("{url}: body read failed: {e}")))?;

        serde_json::from_str(&body).map_err(|e| AuditError::parse(format!("{url}: {e}")))
    }

    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl LglApi for LglClient {
    async fn get(&self, path: &str) -> Result<Value> {
        let result = self.send(path).await;
        self.pace().await;
        result
    }
}
