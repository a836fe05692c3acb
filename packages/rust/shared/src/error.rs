//! Error types for the contact audit.
//!
//! Library crates use [`AuditError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all contact audit operations.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// A credential could not be resolved from an explicit value or the environment.
    #[error("missing credential: {name} (set the {env_var} environment variable)")]
    MissingCredential { name: String, env_var: String },

    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// A remote API answered with a non-success status.
    #[error("{service} API call failed. Status code: {status} ({url})")]
    Http {
        service: &'static str,
        status: u16,
        url: String,
    },

    /// OAuth2 handshake rejected or returned an unusable token.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Response body did not match the expected shape.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a missing-credential error naming the env var that would satisfy it.
    pub fn missing_credential(name: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self::MissingCredential {
            name: name.into(),
            env_var: env_var.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
