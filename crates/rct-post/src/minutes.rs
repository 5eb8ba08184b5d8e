// crates/rct-post/src/minutes.rs
// ============================================================================
// Module: Minutes Generator
// Description: Categorical prose summary of batch-posted quality flags.
// Purpose: Append a human-readable block per batch invocation to a minutes file.
// Dependencies: rct-core
// ============================================================================

//! ## Overview
//! Successfully posted runs are classified by the flag type they received
//! into seven fixed quality categories. The block lists every run, then
//! either one "all the runs" sentence when a single category covers the whole
//! set, or one line per non-empty category in a fixed order.
//!
//! The "same quality as the previous pass" clause only applies to the
//! tracking, acceptance and PID categories.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use rct_core::FlagPostRequest;
use rct_core::FlagTypeId;

use crate::PostingError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Clause appended when the quality did not change from the previous pass.
pub const SAME_QUALITY_CLAUSE: &str = "The quality was the same in the previous pass.";
/// Sentence written when no run was posted.
pub const NO_RUNS_SENTENCE: &str = "No runs to report.";

// ============================================================================
// SECTION: Categories
// ============================================================================

/// Quality categories recognised in minutes, in line order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityCategory {
    /// Good run.
    Good,
    /// Bad tracking.
    BadTracking,
    /// Limited acceptance, reproducible in MC.
    LimitedAcceptanceReproducible,
    /// Limited acceptance, not reproducible in MC.
    LimitedAcceptanceNotReproducible,
    /// Bad particle identification.
    BadPid,
    /// Unknown quality.
    Unknown,
    /// No detector data.
    NoDetectorData,
}

impl QualityCategory {
    /// Every category in line order.
    pub const ALL: [Self; 7] = [
        Self::Good,
        Self::BadTracking,
        Self::LimitedAcceptanceReproducible,
        Self::LimitedAcceptanceNotReproducible,
        Self::BadPid,
        Self::Unknown,
        Self::NoDetectorData,
    ];

    /// Maps a posted flag type to its category.
    #[must_use]
    pub const fn from_flag_type(flag_type_id: FlagTypeId) -> Option<Self> {
        match flag_type_id.get() {
            9 => Some(Self::Good),
            7 => Some(Self::BadTracking),
            5 => Some(Self::LimitedAcceptanceReproducible),
            4 => Some(Self::LimitedAcceptanceNotReproducible),
            6 => Some(Self::BadPid),
            14 => Some(Self::Unknown),
            3 => Some(Self::NoDetectorData),
            _ => None,
        }
    }

    /// Label used in "Runs flagged as" sentences.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::BadTracking => "Bad tracking",
            Self::LimitedAcceptanceReproducible => "Limited acceptance (MC reproducible)",
            Self::LimitedAcceptanceNotReproducible => "Limited acceptance (MC Not reproducible)",
            Self::BadPid => "Bad PID",
            Self::Unknown => "Unknown",
            Self::NoDetectorData => "No Detector Data",
        }
    }

    /// Returns true when the same-quality clause applies.
    #[must_use]
    pub const fn carries_same_quality(self) -> bool {
        matches!(
            self,
            Self::BadTracking
                | Self::LimitedAcceptanceReproducible
                | Self::LimitedAcceptanceNotReproducible
                | Self::BadPid
        )
    }

    /// Sentence written when every run falls in this category.
    fn all_runs_sentence(self, no_diff: bool) -> String {
        match self {
            Self::Good => "All the runs are GOOD.".to_string(),
            category if category.carries_same_quality() => {
                let clause = if no_diff { SAME_QUALITY_CLAUSE } else { "" };
                format!("All the runs have been flagged as {}. {clause}", category.label())
            }
            category => format!("All the runs have been flagged as {}.", category.label()),
        }
    }

    /// Line listing the runs of this category.
    fn category_line(self, runs: &[u64], no_diff: bool) -> String {
        let list = join_runs(runs);
        match self {
            Self::Good => format!("GOOD runs: {list}."),
            category if category.carries_same_quality() && no_diff => {
                format!("Runs flagged as {}: {list}. {SAME_QUALITY_CLAUSE}", category.label())
            }
            category => format!("Runs flagged as {}: {list}.", category.label()),
        }
    }
}

// ============================================================================
// SECTION: Composition
// ============================================================================

/// Composes the minutes block for one batch invocation.
///
/// `posted` holds the successful posts in completion order.
#[must_use]
pub fn compose_minutes(data_pass: &str, posted: &[FlagPostRequest], no_diff: bool) -> String {
    let runs: Vec<u64> = posted.iter().map(|request| request.run_number).collect();
    let mut text = format!("{data_pass}\nRuns: ");
    if runs.is_empty() {
        text.push_str(NO_RUNS_SENTENCE);
        text.push_str("\n\n");
        return text;
    }
    text.push_str(&join_runs(&runs));
    text.push_str(".\n");

    let categorised: Vec<(QualityCategory, Vec<u64>)> = QualityCategory::ALL
        .into_iter()
        .map(|category| {
            let members = posted
                .iter()
                .filter(|request| {
                    QualityCategory::from_flag_type(request.flag_type_id) == Some(category)
                })
                .map(|request| request.run_number)
                .collect();
            (category, members)
        })
        .collect();

    let uniform = categorised.iter().find(|(_, members)| members.len() == runs.len());
    if let Some((category, _)) = uniform {
        text.push_str(&category.all_runs_sentence(no_diff));
        text.push_str("\n\n");
        return text;
    }

    for (category, members) in &categorised {
        if !members.is_empty() {
            text.push_str(&category.category_line(members, no_diff));
            text.push('\n');
        }
    }
    text.push('\n');
    text
}

/// Joins run numbers with `", "`.
fn join_runs(runs: &[u64]) -> String {
    runs.iter().map(u64::to_string).collect::<Vec<_>>().join(", ")
}

/// Appends a minutes block, creating the file when missing.
///
/// # Errors
///
/// Returns [`PostingError::Minutes`] when the file cannot be opened or written.
pub fn append_minutes(path: &Path, text: &str) -> Result<(), PostingError> {
    let failure = |err: std::io::Error| PostingError::Minutes(format!("{}: {err}", path.display()));
    let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(failure)?;
    file.write_all(text.as_bytes()).map_err(failure)
}
