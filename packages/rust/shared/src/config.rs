//! Application configuration for the contact audit.
//!
//! User config lives at `~/.contactaudit/contactaudit.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets never live in the file: the config only names the environment
//! variables that hold them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contactaudit.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contactaudit";

// ---------------------------------------------------------------------------
// Config structs (matching contactaudit.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Little Green Light API settings.
    #[serde(default)]
    pub lgl: LglConfig,

    /// HEART (Salesforce) settings.
    #[serde(default)]
    pub heart: HeartConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[lgl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LglConfig {
    /// Base URL every relative API path is joined onto.
    #[serde(default = "default_lgl_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API token.
    #[serde(default = "default_lgl_token_env")]
    pub token_env: String,

    /// Pause after every call, in ms, to stay under the LGL rate limit.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LglConfig {
    fn default() -> Self {
        Self {
            base_url: default_lgl_base_url(),
            token_env: default_lgl_token_env(),
            request_delay_ms: default_request_delay(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_lgl_base_url() -> String {
    "https://api.littlegreenlight.com/api/v1/".into()
}
fn default_lgl_token_env() -> String {
    "LGL_TOKEN".into()
}
fn default_request_delay() -> u64 {
    1500
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[heart]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartConfig {
    /// Name of the env var holding the OAuth2 consumer key.
    #[serde(default = "default_consumer_key_env")]
    pub consumer_key_env: String,

    /// Name of the env var holding the OAuth2 consumer secret.
    #[serde(default = "default_consumer_secret_env")]
    pub consumer_secret_env: String,

    /// Redirect URI registered with the connected app.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// REST API version used for queries.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Sandbox org. Left unset, the CLI asks on each run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<bool>,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            consumer_key_env: default_consumer_key_env(),
            consumer_secret_env: default_consumer_secret_env(),
            redirect_uri: default_redirect_uri(),
            api_version: default_api_version(),
            sandbox: None,
        }
    }
}

fn default_consumer_key_env() -> String {
    "HEART_CONSUMER_KEY".into()
}
fn default_consumer_secret_env() -> String {
    "HEART_CONSUMER_SECRET".into()
}
fn default_redirect_uri() -> String {
    "https://salesforce.shirconnect.com".into()
}
fn default_api_version() -> String {
    "52.0".into()
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the dated CSV report is written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contactaudit/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| AuditError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contactaudit/contactaudit.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AuditError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| AuditError::config(format!("failed to parse {}: {e}", path.display())))?;

    url::Url::parse(&config.lgl.base_url).map_err(|e| {
        AuditError::config(format!("invalid lgl.base_url '{}': {e}", config.lgl.base_url))
    })?;

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AuditError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AuditError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AuditError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Credential resolution
// ---------------------------------------------------------------------------

/// Resolve a secret: explicit value first, then the process environment.
///
/// Empty values count as absent. When neither source yields a value the
/// caller gets [`AuditError::MissingCredential`] and decides whether to prompt.
pub fn resolve_credential(explicit: Option<&str>, env_var: &str, name: &str) -> Result<String> {
    resolve_credential_with(explicit, env_var, name, |key| std::env::var(key).ok())
}

/// [`resolve_credential`] with an injectable environment lookup.
pub fn resolve_credential_with<F>(
    explicit: Option<&str>,
    env_var: &str,
    name: &str,
    lookup: F,
) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = explicit.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }

    match lookup(env_var) {
        Some(value) if !value.is_empty() => {
            tracing::debug!(env_var, "credential resolved from environment");
            Ok(value)
        }
        _ => Err(AuditError::missing_credential(name, env_var)),
    }
}
