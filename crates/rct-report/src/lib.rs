// crates/rct-report/src/lib.rs
// ============================================================================
// Module: RCT Report Library
// Description: Per-run detector flag reports for data passes.
// Purpose: Build report tables from metadata and write them as CSV.
// Dependencies: rct-core, csv
// ============================================================================

//! ## Overview
//! `rct-report` reads runs and flags through [`rct_core::MetadataSource`],
//! renders one table per data pass, and writes it to a CSV file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builder;
pub mod output;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use builder::DETECTOR_ABSENT_CELL;
pub use builder::RUN_NUMBER_HEADER;
pub use builder::Report;
pub use builder::ReportError;
pub use builder::ReportRequest;
pub use builder::ReportRow;
pub use builder::build_report;
pub use builder::report_header;
pub use output::report_file_name;
pub use output::write_report;
pub use output::write_report_file;
