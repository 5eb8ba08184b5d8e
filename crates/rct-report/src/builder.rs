// crates/rct-report/src/builder.rs
// ============================================================================
// Module: Report Builder
// Description: Assembles per-run report rows for one data pass.
// Purpose: Join run metadata, detector involvement, and rendered flags.
// Dependencies: rct-core, tracing
// ============================================================================

//! ## Overview
//! A report holds one row per run of a data pass, optionally restricted to a
//! run-number range. Each row carries the run number, the extra run fields in
//! fixed column order, and one cell per configured detector. Detectors that
//! did not take part in a run render `Not present` without a flag fetch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rct_core::DataPass;
use rct_core::Detector;
use rct_core::EXTRA_RUN_FIELDS;
use rct_core::MetadataError;
use rct_core::MetadataSource;
use rct_core::NOT_AVAILABLE_VALUE;
use rct_core::RenderOptions;
use rct_core::Run;
use rct_core::RunFetchOptions;
use rct_core::RunRange;
use rct_core::render_flags;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header of the leading run number column.
pub const RUN_NUMBER_HEADER: &str = "Run Number";
/// Cell text for a detector that did not take part in the run.
pub const DETECTOR_ABSENT_CELL: &str = "Not present";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Inputs for one data pass report.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    /// Resolved data pass.
    pub data_pass: &'a DataPass,
    /// Detectors in column order.
    pub detectors: &'a [Detector],
    /// Inclusive run-number filter.
    pub range: RunRange,
    /// Render timestamps as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub convert_time: bool,
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Run number.
    pub run_number: u64,
    /// Extra run field values in column order.
    pub extra_fields: Vec<String>,
    /// Detector cells in column order.
    pub detector_cells: Vec<String>,
}

impl ReportRow {
    /// Returns the row as CSV record fields.
    #[must_use]
    pub fn record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(1 + self.extra_fields.len() + self.detector_cells.len());
        record.push(self.run_number.to_string());
        record.extend(self.extra_fields.iter().cloned());
        record.extend(self.detector_cells.iter().cloned());
        record
    }
}

/// A complete data pass report.
///
/// # Invariants
/// - Every row has as many fields as `header`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Column names.
    pub header: Vec<String>,
    /// Rows in service run order.
    pub rows: Vec<ReportRow>,
}

/// Report building errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A metadata read failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    /// The report file could not be written.
    #[error("report write failed: {0}")]
    Write(String),
}

// ============================================================================
// SECTION: Building
// ============================================================================

/// Returns the report header for the given detectors.
#[must_use]
pub fn report_header(detectors: &[Detector]) -> Vec<String> {
    std::iter::once(RUN_NUMBER_HEADER)
        .chain(EXTRA_RUN_FIELDS)
        .chain(detectors.iter().map(|detector| detector.name.as_str()))
        .map(str::to_string)
        .collect()
}

/// Builds the report for one data pass.
///
/// # Errors
///
/// Returns [`ReportError::Metadata`] when the run listing or any flag read
/// fails; a partial report is never returned.
pub fn build_report(
    source: &dyn MetadataSource,
    request: &ReportRequest<'_>,
) -> Result<Report, ReportError> {
    let options = RunFetchOptions::report(request.convert_time);
    let runs = source.fetch_runs(request.data_pass.id, &options)?;
    let mut rows = Vec::new();
    for run in runs.iter().filter(|run| request.range.contains(run.run_number)) {
        rows.push(build_row(source, request, run)?);
    }
    debug!(data_pass = %request.data_pass.name, rows = rows.len(), "report built");
    Ok(Report {
        header: report_header(request.detectors),
        rows,
    })
}

/// Builds the row of one run.
fn build_row(
    source: &dyn MetadataSource,
    request: &ReportRequest<'_>,
    run: &Run,
) -> Result<ReportRow, ReportError> {
    let extra_fields = EXTRA_RUN_FIELDS
        .iter()
        .map(|name| {
            run.field(name).map_or_else(|| NOT_AVAILABLE_VALUE.to_string(), ToString::to_string)
        })
        .collect();
    let render = RenderOptions {
        convert_time: request.convert_time,
    };
    let mut detector_cells = Vec::with_capacity(request.detectors.len());
    for detector in request.detectors {
        if !run.involves(&detector.name) {
            detector_cells.push(DETECTOR_ABSENT_CELL.to_string());
            continue;
        }
        let flags = source.fetch_flags(request.data_pass.id, run.run_number, detector.id)?;
        detector_cells.push(render_flags(&flags, run, render));
    }
    Ok(ReportRow {
        run_number: run.run_number,
        extra_fields,
        detector_cells,
    })
}
