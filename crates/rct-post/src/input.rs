// crates/rct-post/src/input.rs
// ============================================================================
// Module: Posting Inputs
// Description: Readers for interval files and batch CSV files.
// Purpose: Turn externally edited run lists into typed posting entries.
// Dependencies: csv, rct-core, tracing
// ============================================================================

//! ## Overview
//! Interval files hold one `<run> <tmin> <tmax> [# comment]` entry per line.
//! Malformed lines are skipped, never fatal. Batch files are CSV tables with
//! a header naming `run_number`, `post`, an optional `comment`, and one
//! column per data pass holding the flag type to post; only rows whose
//! `post` cell is `ok` are read. Numeric cells exported from spreadsheets as
//! floats (`523897.0`) are accepted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::Path;

use rct_core::FlagTypeId;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Batch column holding the run number.
pub const RUN_NUMBER_COLUMN: &str = "run_number";
/// Batch column holding the approval status.
pub const POST_COLUMN: &str = "post";
/// Optional batch column holding the flag comment.
pub const COMMENT_COLUMN: &str = "comment";
/// Approval value selecting a batch row for posting.
pub const APPROVED_VALUE: &str = "ok";
/// Comment posted for batch rows with a missing or blank comment.
pub const BLANK_BATCH_COMMENT: &str = " ";
/// Interval file comment marker.
const COMMENT_MARKER: char = '#';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Input file errors.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("input io error: {0}")]
    Io(String),
    /// The CSV table could not be parsed.
    #[error("batch file parse error: {0}")]
    Csv(String),
    /// A required batch column is missing.
    #[error("batch file has no column named {0}")]
    MissingColumn(String),
}

// ============================================================================
// SECTION: Interval Entries
// ============================================================================

/// One time-resolved posting request from an interval file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalEntry {
    /// Target run.
    pub run_number: u64,
    /// Window start (milliseconds).
    pub tmin: i64,
    /// Window end (milliseconds).
    pub tmax: i64,
    /// Per-entry comment; `None` when absent or empty.
    pub comment: Option<String>,
}

/// Parses interval file content.
///
/// Blank lines and lines starting with `#` are ignored. Text after the first
/// `#` is the entry comment. Lines with fewer than three fields, or whose
/// first three fields are not integers, are skipped.
#[must_use]
pub fn parse_interval_lines(content: &str) -> Vec<IntervalEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| parse_interval_line(index + 1, line))
        .collect()
}

/// Parses a single interval line.
fn parse_interval_line(line_number: usize, line: &str) -> Option<IntervalEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_MARKER) {
        return None;
    }
    let (main, comment) = match line.split_once(COMMENT_MARKER) {
        Some((main, comment)) => (main.trim(), Some(comment.trim())),
        None => (line, None),
    };
    let fields: Vec<&str> = main.split_whitespace().collect();
    let [run, tmin, tmax, ..] = fields.as_slice() else {
        debug!(line = line_number, "interval line has fewer than three fields");
        return None;
    };
    let (Ok(run_number), Ok(tmin), Ok(tmax)) = (run.parse(), tmin.parse(), tmax.parse()) else {
        debug!(line = line_number, "interval line has non-integer fields");
        return None;
    };
    Some(IntervalEntry {
        run_number,
        tmin,
        tmax,
        comment: comment.filter(|text| !text.is_empty()).map(str::to_string),
    })
}

/// Reads and parses an interval file.
///
/// # Errors
///
/// Returns [`InputError::Io`] when the file cannot be read.
pub fn read_interval_file(path: &Path) -> Result<Vec<IntervalEntry>, InputError> {
    let content = fs::read_to_string(path)
        .map_err(|err| InputError::Io(format!("{}: {err}", path.display())))?;
    Ok(parse_interval_lines(&content))
}

// ============================================================================
// SECTION: Batch Rows
// ============================================================================

/// One approved batch row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// Target run.
    pub run_number: u64,
    /// Flag type read from the data pass column.
    pub flag_type_id: FlagTypeId,
    /// Comment to post (a single space when blank).
    pub comment: String,
}

/// Reads approved rows from batch CSV content.
///
/// # Errors
///
/// Returns [`InputError::MissingColumn`] when `run_number`, `post`, or the
/// data pass column is absent, and [`InputError::Csv`] for malformed CSV.
pub fn parse_batch<R: Read>(reader: R, data_pass: &str) -> Result<Vec<BatchRow>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers().map_err(|err| InputError::Csv(err.to_string()))?.clone();
    let column = |name: &str| headers.iter().position(|header| header.trim() == name);
    let missing = |name: &str| InputError::MissingColumn(name.to_string());
    let run_column = column(RUN_NUMBER_COLUMN).ok_or_else(|| missing(RUN_NUMBER_COLUMN))?;
    let post_column = column(POST_COLUMN).ok_or_else(|| missing(POST_COLUMN))?;
    let flag_column = column(data_pass).ok_or_else(|| missing(data_pass))?;
    let comment_column = column(COMMENT_COLUMN);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|err| InputError::Csv(err.to_string()))?;
        let cell = |position: usize| record.get(position).map_or("", str::trim);
        if cell(post_column) != APPROVED_VALUE {
            continue;
        }
        let row_number = index + 2;
        let Some(run_number) = parse_integral(cell(run_column)) else {
            warn!(
                row = row_number,
                value = cell(run_column),
                "invalid run number in batch file, skipping"
            );
            continue;
        };
        let Some(flag_type_id) =
            parse_integral(cell(flag_column)).and_then(|raw| u32::try_from(raw).ok())
        else {
            warn!(
                row = row_number,
                run = run_number,
                value = cell(flag_column),
                "invalid flag type in column {data_pass}, skipping"
            );
            continue;
        };
        let comment = comment_column
            .and_then(|position| record.get(position))
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(BLANK_BATCH_COMMENT)
            .to_string();
        rows.push(BatchRow {
            run_number,
            flag_type_id: FlagTypeId::new(flag_type_id),
            comment,
        });
    }
    Ok(rows)
}

/// Reads approved rows from a batch CSV file.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be read or lacks required columns.
pub fn read_batch_file(path: &Path, data_pass: &str) -> Result<Vec<BatchRow>, InputError> {
    let file =
        fs::File::open(path).map_err(|err| InputError::Io(format!("{}: {err}", path.display())))?;
    parse_batch(file, data_pass)
}

/// Parses an unsigned integer, accepting a zero fractional part (`42.0`).
#[must_use]
pub fn parse_integral(text: &str) -> Option<u64> {
    let text = text.trim();
    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if !fraction.chars().all(|digit| digit == '0') {
        return None;
    }
    whole.parse().ok()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
