//! HEART CRM access.
//!
//! HEART is a Salesforce org. Access is an OAuth2 authorization-code
//! exchange ([`auth`]) followed by SOQL queries ([`client`]) that page
//! through `nextRecordsUrl` until the result set is complete.

pub mod auth;
pub mod client;

pub use auth::{AccessToken, HeartCredentials, exchange_code};
pub use client::{ContactSource, DEFAULT_API_VERSION, HeartClient, contact_query};
