//! Shared types, error model, and configuration for the contact audit.
//!
//! This crate is the foundation depended on by all other contactaudit crates.
//! It provides:
//! - [`AuditError`]: the unified error type
//! - Domain types ([`ConstituentDetail`], [`HeartContact`], [`ContactField`], [`ReportRow`])
//! - Configuration ([`AppConfig`], config loading, credential resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, HeartConfig, LglConfig, ReportConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from, resolve_credential, resolve_credential_with,
};
pub use error::{AuditError, Result};
pub use types::{
    CONTACT_FIELDS, ConstituentDetail, ConstituentPage, ConstituentSummary, ContactField,
    EmailAddress, FieldKind, HeartContact, MissingCategory, NameKey, PhoneNumber, ReportRow,
};
