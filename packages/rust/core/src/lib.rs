//! Reconciliation, reporting, and pipeline orchestration for the contact audit.
//!
//! This crate ties the HEART and LGL pulls together with the reconciliation
//! engine and the CSV sink into one end-to-end run
//! ([`pipeline::build_missing_contact_report`]).

pub mod pipeline;
pub mod reconcile;
pub mod report;
