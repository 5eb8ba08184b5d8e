// crates/rct-report/src/output.rs
// ============================================================================
// Module: Report Output
// Description: Report file naming and CSV serialization.
// Purpose: Write one collision-free CSV file per data pass and range.
// Dependencies: csv
// ============================================================================

//! ## Overview
//! File names encode the data pass and whichever run range bounds are set,
//! so differently filtered exports of the same pass never overwrite each
//! other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rct_core::RunRange;

use crate::builder::Report;
use crate::builder::ReportError;

// ============================================================================
// SECTION: Naming
// ============================================================================

/// Returns the report file name for a data pass and run range.
#[must_use]
pub fn report_file_name(data_pass: &str, range: RunRange) -> String {
    let safe = data_pass.replace([' ', '/'], "_");
    match (range.lo, range.hi) {
        (Some(lo), Some(hi)) => format!("Runs_{safe}_{lo}_{hi}.csv"),
        (Some(lo), None) => format!("Runs_{safe}_from_{lo}.csv"),
        (None, Some(hi)) => format!("Runs_{safe}_to_{hi}.csv"),
        (None, None) => format!("Runs_{safe}.csv"),
    }
}

// ============================================================================
// SECTION: CSV Writing
// ============================================================================

/// Serializes a report as CSV into `writer`.
///
/// # Errors
///
/// Returns [`ReportError::Write`] when a record cannot be written.
pub fn write_report<W: Write>(writer: W, report: &Report) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&report.header).map_err(|err| ReportError::Write(err.to_string()))?;
    for row in &report.rows {
        csv_writer.write_record(row.record()).map_err(|err| ReportError::Write(err.to_string()))?;
    }
    csv_writer.flush().map_err(|err| ReportError::Write(err.to_string()))
}

/// Creates (or truncates) `path` and writes the report to it.
///
/// # Errors
///
/// Returns [`ReportError::Write`] when the file cannot be created or written.
pub fn write_report_file(path: &Path, report: &Report) -> Result<(), ReportError> {
    let file = File::create(path)
        .map_err(|err| ReportError::Write(format!("{}: {err}", path.display())))?;
    write_report(file, report)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
