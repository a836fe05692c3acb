//! OAuth2 authorization-code exchange against the Salesforce login service.

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use contactaudit_shared::{AuditError, Result};

const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";
const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";
const TOKEN_PATH: &str = "/services/oauth2/token";

/// Everything needed to trade a one-time access code for a session.
#[derive(Clone)]
pub struct HeartCredentials {
    /// Connected-app consumer key.
    pub client_id: String,
    /// Connected-app consumer secret.
    pub client_secret: String,
    /// One-time authorization code from the redirect.
    pub access_code: String,
    pub redirect_uri: String,
    /// Authenticate against the sandbox login host.
    pub sandbox: bool,
}

impl std::fmt::Debug for HeartCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_code", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

impl HeartCredentials {
    /// Login host for this org type.
    pub fn login_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_LOGIN_URL
        } else {
            PRODUCTION_LOGIN_URL
        }
    }
}

/// Session returned by a successful exchange.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Org-specific API host all queries go to.
    pub instance_url: String,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// Exchange the authorization code at `login_url` for an access token.
///
/// The request runs under `client`'s own timeout.
#[instrument(skip_all, fields(login_url = %login_url, sandbox = credentials.sandbox))]
pub async fn exchange_code(
    client: &Client,
    login_url: &str,
    credentials: &HeartCredentials,
) -> Result<AccessToken> {
    let url = format!("{}{TOKEN_PATH}", login_url.trim_end_matches('/'));

    let form = [
        ("grant_type", "authorization_code"),
        ("code", credentials.access_code.as_str()),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("redirect_uri", credentials.redirect_uri.as_str()),
    ];

    let response = client
        .post(&url)
        .form(&form)
        .send()
        .await
        .map_err(|e| AuditError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuditError::Auth(format!(
            "token exchange failed with HTTP {status}: {body}"
        )));
    }

    let token: AccessToken = response
        .json()
        .await
        .map_err(|e| AuditError::Auth(format!("unreadable token response: {e}")))?;

    if token.access_token.is_empty() {
        return Err(AuditError::Auth("token response had an empty access_token".into()));
    }

    info!(instance_url = %token.instance_url, "authenticated with HEART");
    Ok(token)
}
