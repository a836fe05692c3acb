//! CSV output for the missing-contact report.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, instrument};

use contactaudit_shared::{AuditError, ReportRow, Result};

/// Report files are named `<prefix>_<YYYY-MM-DD>.csv`.
pub const REPORT_FILE_PREFIX: &str = "missing_contact_report";

/// File name for a report produced on `date`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("{REPORT_FILE_PREFIX}_{}.csv", date.format("%Y-%m-%d"))
}

/// Write the header and `rows` as CSV to any writer.
pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> csv::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(ReportRow::header())?;
    for row in rows {
        csv.write_record(row.record())?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the dated report file into `dir` and return its path.
#[instrument(skip_all, fields(dir = %dir.display(), rows = rows.len()))]
pub fn write_report(dir: &Path, date: NaiveDate, rows: &[ReportRow]) -> Result<PathBuf> {
    let path = dir.join(report_file_name(date));

    let file = std::fs::File::create(&path).map_err(|e| AuditError::io(&path, e))?;
    write_rows(file, rows).map_err(|e| AuditError::io(&path, e.into()))?;

    info!(path = %path.display(), "wrote missing contact report");
    Ok(path)
}
