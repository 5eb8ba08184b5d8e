// crates/rct-post/src/plan.rs
// ============================================================================
// Module: Posting Plans
// Description: The three posting modes and their request planning.
// Purpose: Turn a mode and the fetched run set into ordered flag posts.
// Dependencies: rct-core, tracing
// ============================================================================

//! ## Overview
//! Posting runs in exactly one [`PostingMode`]. Each mode validates its
//! source records against the data pass run set, skips what it must (with a
//! log line where the operator needs to know), and yields the ordered
//! [`FlagPostRequest`] list consumed by the posting engine.
//!
//! - Global: one run-wide flag per accepted run involving the detector.
//! - Batch: one run-wide flag per approved row with a known run.
//! - Interval: one time-window flag per accepted entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use rct_core::DataPass;
use rct_core::Detector;
use rct_core::FlagPostRequest;
use rct_core::FlagTypeId;
use rct_core::Run;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::filter::RunFilter;
use crate::input::BatchRow;
use crate::input::IntervalEntry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Comment used for interval flags when neither the caller nor the entry supplies one.
pub const DEFAULT_INTERVAL_COMMENT: &str = "Interval flag";
/// Separator between caller and entry comments.
pub const COMMENT_SEPARATOR: &str = " | ";

// ============================================================================
// SECTION: Modes
// ============================================================================

/// Target of every post in one invocation.
#[derive(Debug, Clone, Copy)]
pub struct PostingTarget<'a> {
    /// Resolved data pass.
    pub data_pass: &'a DataPass,
    /// Detector to flag.
    pub detector: &'a Detector,
}

impl PostingTarget<'_> {
    /// Builds a request for this target.
    fn request(
        &self,
        run_number: u64,
        flag_type_id: FlagTypeId,
        comment: Option<String>,
        window: Option<(i64, i64)>,
    ) -> FlagPostRequest {
        FlagPostRequest {
            from: window.map(|(from, _)| from),
            to: window.map(|(_, to)| to),
            comment,
            flag_type_id,
            run_number,
            detector_id: self.detector.id,
            data_pass_id: self.data_pass.id,
        }
    }
}

/// Run-wide posting over the whole data pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPlan {
    /// Flag type posted to every accepted run.
    pub flag_type_id: FlagTypeId,
    /// Comment posted with every flag.
    pub comment: Option<String>,
    /// Run filter.
    pub filter: RunFilter,
}

/// Time-window posting from interval entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalPlan {
    /// Flag type posted for every entry.
    pub flag_type_id: FlagTypeId,
    /// Caller comment combined with each entry comment.
    pub comment: Option<String>,
    /// Run filter.
    pub filter: RunFilter,
    /// Entries in file order.
    pub entries: Vec<IntervalEntry>,
}

/// The posting mode of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostingMode {
    /// One flag per accepted run.
    Global(GlobalPlan),
    /// One flag per approved batch row.
    Batch(Vec<BatchRow>),
    /// One flag per interval entry.
    Interval(IntervalPlan),
}

impl PostingMode {
    /// Returns a short mode label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Global(_) => "global",
            Self::Batch(_) => "batch",
            Self::Interval(_) => "interval",
        }
    }

    /// Plans the ordered posts of this mode against the fetched runs.
    #[must_use]
    pub fn plan(&self, target: &PostingTarget<'_>, runs: &[Run]) -> Vec<FlagPostRequest> {
        let requests = match self {
            Self::Global(plan) => plan_global(plan, target, runs),
            Self::Batch(rows) => plan_batch(rows, target, runs),
            Self::Interval(plan) => plan_interval(plan, target, runs),
        };
        debug!(mode = self.label(), planned = requests.len(), "posting plan ready");
        requests
    }
}

// ============================================================================
// SECTION: Planning
// ============================================================================

/// Plans run-wide flags for every accepted run involving the detector.
fn plan_global(plan: &GlobalPlan, target: &PostingTarget<'_>, runs: &[Run]) -> Vec<FlagPostRequest> {
    runs.iter()
        .filter(|run| plan.filter.accepts(run.run_number))
        .filter(|run| run.involves(&target.detector.name))
        .map(|run| target.request(run.run_number, plan.flag_type_id, plan.comment.clone(), None))
        .collect()
}

/// Plans run-wide flags for approved batch rows with known runs.
fn plan_batch(rows: &[BatchRow], target: &PostingTarget<'_>, runs: &[Run]) -> Vec<FlagPostRequest> {
    let known = index_runs(runs);
    rows.iter()
        .filter(|row| {
            let found = known.contains_key(&row.run_number);
            if !found {
                error!(
                    "Run number {} not found in data pass {}.",
                    row.run_number, target.data_pass.name
                );
            }
            found
        })
        .map(|row| {
            target.request(row.run_number, row.flag_type_id, Some(row.comment.clone()), None)
        })
        .collect()
}

/// Plans time-window flags for accepted interval entries.
fn plan_interval(
    plan: &IntervalPlan,
    target: &PostingTarget<'_>,
    runs: &[Run],
) -> Vec<FlagPostRequest> {
    let known = index_runs(runs);
    let mut requests = Vec::new();
    for entry in &plan.entries {
        let Some(run) = known.get(&entry.run_number) else {
            warn!(
                "Run {} from interval file is not in data pass {}, skipping.",
                entry.run_number, target.data_pass.name
            );
            continue;
        };
        if !plan.filter.accepts(entry.run_number) {
            debug!(run = entry.run_number, "interval entry filtered out");
            continue;
        }
        if !run.involves(&target.detector.name) {
            warn!(
                "Detector {} not in run {}, skipping.",
                target.detector.name, entry.run_number
            );
            continue;
        }
        let comment = compose_interval_comment(plan.comment.as_deref(), entry.comment.as_deref());
        requests.push(target.request(
            entry.run_number,
            plan.flag_type_id,
            Some(comment),
            Some(widen_window(entry.tmin, entry.tmax)),
        ));
    }
    requests
}

/// Indexes runs by run number.
fn index_runs(runs: &[Run]) -> BTreeMap<u64, &Run> {
    runs.iter().map(|run| (run.run_number, run)).collect()
}

/// Widens a zero-width window to one millisecond.
#[must_use]
pub const fn widen_window(tmin: i64, tmax: i64) -> (i64, i64) {
    if tmin == tmax { (tmin, tmin.saturating_add(1)) } else { (tmin, tmax) }
}

/// Combines the caller comment and the entry comment.
#[must_use]
pub fn compose_interval_comment(caller: Option<&str>, entry: Option<&str>) -> String {
    let caller = caller.filter(|text| !text.is_empty());
    let entry = entry.filter(|text| !text.is_empty());
    match (caller, entry) {
        (Some(caller), Some(entry)) => format!("{caller}{COMMENT_SEPARATOR}{entry}"),
        (Some(text), None) | (None, Some(text)) => text.to_string(),
        (None, None) => DEFAULT_INTERVAL_COMMENT.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::compose_interval_comment;
    use super::widen_window;

    #[test]
    fn zero_width_window_is_widened() {
        assert_eq!(widen_window(1_000, 1_000), (1_000, 1_001));
        assert_eq!(widen_window(1_000, 2_000), (1_000, 2_000));
    }

    #[test]
    fn interval_comment_composition() {
        assert_eq!(compose_interval_comment(Some("a"), Some("b")), "a | b");
        assert_eq!(compose_interval_comment(Some("a"), None), "a");
        assert_eq!(compose_interval_comment(None, Some("b")), "b");
        assert_eq!(compose_interval_comment(None, None), "Interval flag");
        assert_eq!(compose_interval_comment(Some(""), None), "Interval flag");
    }
}
