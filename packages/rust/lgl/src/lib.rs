//! Little Green Light data acquisition.
//!
//! This crate provides:
//! - [`client`]: bearer-authenticated, rate-paced REST client
//! - [`walker`]: cursor pagination over `constituents` and per-record detail fetch
//! - [`normalize`]: folding constituent details into the comparison sets

pub mod client;
pub mod normalize;
pub mod walker;

pub use client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_DELAY, LglApi, LglClient};
pub use normalize::{ContactSets, ContactSetsBuilder, collect_contact_sets, normalize_phone};
pub use walker::{cursor_path, list_all_constituents, resolve};
