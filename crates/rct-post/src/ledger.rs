// crates/rct-post/src/ledger.rs
// ============================================================================
// Module: Outcome Ledger
// Description: Per-run success and failure accounting for flag posts.
// Purpose: Aggregate post outcomes for the end-of-invocation summary.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Each invocation owns one [`OutcomeLedger`]. Outcomes are recorded in
//! request-completion order; the summary lists runs in ascending order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Summary line emitted when nothing was attempted.
pub const NO_FLAGS_PROCESSED: &str = "INFO: No flags were processed.";
/// Heading of the per-run summary table.
pub const SUMMARY_HEADING: &str = "=== Flag processing summary (per run) ===";

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Post counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Successful posts.
    pub processed: u64,
    /// Failed posts.
    pub failed: u64,
}

impl RunOutcome {
    /// Returns the number of attempted posts.
    #[must_use]
    pub const fn attempted(&self) -> u64 {
        self.processed.saturating_add(self.failed)
    }
}

/// Aggregated post outcomes of one invocation.
///
/// # Invariants
/// - `total_processed` equals the sum of per-run `processed` counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeLedger {
    /// Counters keyed by run number.
    runs: BTreeMap<u64, RunOutcome>,
    /// Successful posts across all runs.
    total_processed: u64,
}

impl OutcomeLedger {
    /// Records a successful post and returns the new success total.
    pub fn record_success(&mut self, run_number: u64) -> u64 {
        let outcome = self.runs.entry(run_number).or_default();
        outcome.processed = outcome.processed.saturating_add(1);
        self.total_processed = self.total_processed.saturating_add(1);
        self.total_processed
    }

    /// Records a failed post.
    pub fn record_failure(&mut self, run_number: u64) {
        let outcome = self.runs.entry(run_number).or_default();
        outcome.failed = outcome.failed.saturating_add(1);
    }

    /// Returns the counters of one run.
    #[must_use]
    pub fn outcome(&self, run_number: u64) -> RunOutcome {
        self.runs.get(&run_number).copied().unwrap_or_default()
    }

    /// Returns the number of successful posts.
    #[must_use]
    pub const fn total_processed(&self) -> u64 {
        self.total_processed
    }

    /// Returns the number of failed posts.
    #[must_use]
    pub fn total_failed(&self) -> u64 {
        self.runs.values().map(|outcome| outcome.failed).sum()
    }

    /// Returns true when no post was attempted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Iterates per-run counters in ascending run order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, RunOutcome)> + '_ {
        self.runs.iter().map(|(run, outcome)| (*run, *outcome))
    }

    /// Renders the end-of-invocation summary lines.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        if self.is_empty() {
            return vec![NO_FLAGS_PROCESSED.to_string()];
        }
        let mut lines = Vec::with_capacity(self.runs.len() + 3);
        lines.push(String::new());
        lines.push(SUMMARY_HEADING.to_string());
        for (run, outcome) in self.iter() {
            lines.push(format!(
                "Run {run}: processed={}, failed={}, total_attempted={}",
                outcome.processed,
                outcome.failed,
                outcome.attempted()
            ));
        }
        lines.push(format!("TOTAL processed flags: {}", self.total_processed));
        lines
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
