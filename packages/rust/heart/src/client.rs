//! Authenticated SOQL queries against the HEART org.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use contactaudit_shared::{AuditError, CONTACT_FIELDS, HeartContact, Result};

use crate::auth::{HeartCredentials, exchange_code};

/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "52.0";

/// User-Agent string for HEART requests.
const USER_AGENT: &str = concat!("contactaudit/", env!("CARGO_PKG_VERSION"));

/// Timeout for every HEART request, token exchange included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that can hand over the full HEART contact list.
pub trait ContactSource {
    fn fetch_contacts(&self) -> impl Future<Output = Result<Vec<HeartContact>>> + Send;
}

/// `SELECT <audited fields> FROM Contact`.
pub fn contact_query() -> String {
    let fields: Vec<&str> = CONTACT_FIELDS.iter().map(|f| f.api_name()).collect();
    format!("SELECT {} FROM Contact", fields.join(", "))
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "totalSize", default)]
    total_size: u64,
    done: bool,
    #[serde(rename = "nextRecordsUrl", default)]
    next_records_url: Option<String>,
    #[serde(default)]
    records: Vec<Value>,
}

// ---------------------------------------------------------------------------
// HeartClient
// ---------------------------------------------------------------------------

pub struct HeartClient {
    client: Client,
    instance_url: Url,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for HeartClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartClient")
            .field("instance_url", &self.instance_url.as_str())
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl HeartClient {
    /// Authenticate with the login host matching `credentials.sandbox`.
    pub async fn connect(credentials: &HeartCredentials, api_version: &str) -> Result<Self> {
        Self::connect_at(credentials.login_url(), credentials, api_version).await
    }

    /// Authenticate against an explicit login host.
    pub async fn connect_at(
        login_url: &str,
        credentials: &HeartCredentials,
        api_version: &str,
    ) -> Result<Self> {
        let client = build_http_client()?;
        let token = exchange_code(&client, login_url, credentials).await?;
        Self::from_parts(client, &token.instance_url, token.access_token, api_version)
    }

    /// Use an already-issued session.
    pub fn with_token(
        instance_url: &str,
        access_token: impl Into<String>,
        api_version: &str,
    ) -> Result<Self> {
        Self::from_parts(
            build_http_client()?,
            instance_url,
            access_token.into(),
            api_version,
        )
    }

    fn from_parts(
        client: Client,
        instance_url: &str,
        access_token: String,
        api_version: &str,
    ) -> Result<Self> {
        let instance_url = Url::parse(instance_url).map_err(|e| {
            AuditError::Auth(format!("invalid instance_url '{instance_url}': {e}"))
        })?;
        Ok(Self {
            client,
            instance_url,
            access_token,
            api_version: api_version.trim_start_matches('v').to_string(),
        })
    }

    /// Run `soql` and follow `nextRecordsUrl` until the result set is done.
    #[instrument(skip_all)]
    pub async fn query_all(&self, soql: &str) -> Result<Vec<Value>> {
        let mut url = self.endpoint(&format!("/services/data/v{}/query", self.api_version))?;
        url.query_pairs_mut().append_pair("q", soql);

        let mut page = self.get_page(url).await?;
        let total = page.total_size;
        let mut records = std::mem::take(&mut page.records);

        while !page.done {
            let Some(next) = page.next_records_url.take() else {
                warn!(fetched = records.len(), total, "query not done but no nextRecordsUrl");
                break;
            };
            page = self.get_page(self.endpoint(&next)?).await?;
            records.append(&mut page.records);
            debug!(fetched = records.len(), total, "fetched query batch");
        }

        info!(records = records.len(), total, "HEART query complete");
        Ok(records)
    }

    async fn get_page(&self, url: Url) -> Result<QueryResponse> {
        debug!(%url, "HEART GET");
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AuditError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Http {
                service: "HEART",
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AuditError::parse(format!("{url}: {e}")))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.instance_url
            .join(path)
            .map_err(|e| AuditError::parse(format!("invalid HEART path '{path}': {e}")))
    }
}

impl ContactSource for HeartClient {
    async fn fetch_contacts(&self) -> Result<Vec<HeartContact>> {
        let records = self.query_all(&contact_query()).await?;
        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(record)
                    .map_err(|e| AuditError::parse(format!("HEART contact record: {e}")))
            })
            .collect()
    }
}

fn build_http_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AuditError::Network(format!("failed to build HTTP client: {e}")))
}
