//! End-to-end audit: HEART contacts → LGL comparison sets → reconcile → CSV.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{error, info, instrument};

use contactaudit_heart::ContactSource;
use contactaudit_lgl::{LglApi, collect_contact_sets};
use contactaudit_shared::{ReportRow, Result};

use crate::reconcile::reconcile;
use crate::report::write_report;

/// Where and under which date the report is written.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Directory for the CSV file.
    pub output_dir: PathBuf,
    /// Date stamped into the file name.
    pub date: NaiveDate,
}

impl ReportOptions {
    /// Report into `output_dir`, dated today in local time.
    pub fn today(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            date: chrono::Local::now().date_naive(),
        }
    }
}

/// Result of a full audit run.
#[derive(Debug)]
pub struct ReportOutcome {
    /// Flagged contacts, in HEART order.
    pub rows: Vec<ReportRow>,
    /// Written report, or `None` if writing failed.
    pub report_path: Option<PathBuf>,
    /// HEART contacts examined.
    pub contact_count: usize,
    /// LGL constituents fetched.
    pub constituent_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each LGL constituent detail is processed.
    fn constituent_processed(&self, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &ReportOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn constituent_processed(&self, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &ReportOutcome) {}
}

/// Run the full audit.
///
/// 1. Pull all HEART contacts
/// 2. Pull every LGL constituent and build the comparison sets
/// 3. Reconcile
/// 4. Write the dated CSV
///
/// Any HEART or LGL failure aborts the run. A failed report write is logged
/// and leaves `report_path` empty; the rows are still returned.
#[instrument(skip_all, fields(output_dir = %options.output_dir.display()))]
pub async fn build_missing_contact_report<H, L>(
    heart: &H,
    lgl: &L,
    options: &ReportOptions,
    progress: &dyn ProgressReporter,
) -> Result<ReportOutcome>
where
    H: ContactSource + Sync,
    L: LglApi + Sync,
{
    let start = Instant::now();

    // --- Phase 1: HEART ---
    progress.phase("Querying HEART contacts");
    let contacts = heart.fetch_contacts().await?;
    info!(contacts = contacts.len(), "HEART contacts loaded");

    // --- Phase 2: LGL ---
    progress.phase("Pulling LGL constituents");
    let mut constituent_count = 0;
    let sets = collect_contact_sets(lgl, |current, total| {
        constituent_count = total;
        progress.constituent_processed(current, total);
    })
    .await?;

    // --- Phase 3: Reconcile ---
    progress.phase("Reconciling contacts");
    let rows = reconcile(&contacts, &sets);
    info!(flagged = rows.len(), "reconciliation complete");

    // --- Phase 4: Report ---
    progress.phase("Writing report");
    let report_path = match write_report(&options.output_dir, options.date, &rows) {
        Ok(path) => Some(path),
        Err(e) => {
            error!(error = %e, "Failed to write the report to CSV.");
            None
        }
    };

    let outcome = ReportOutcome {
        rows,
        report_path,
        contact_count: contacts.len(),
        constituent_count,
        elapsed: start.elapsed(),
    };

    progress.done(&outcome);
    Ok(outcome)
}
