// crates/rct-post/src/filter.rs
// ============================================================================
// Module: Run Filter
// Description: Run-number exclusion and range filtering for posting.
// Purpose: Share one filter between global and interval posting.
// Dependencies: rct-core
// ============================================================================

//! ## Overview
//! A [`RunFilter`] rejects explicitly excluded runs and runs outside an
//! optional inclusive `[min_run, max_run]` window.

use std::collections::BTreeSet;

use rct_core::RunRange;

/// Run-number filter applied before posting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    /// Inclusive accepted range.
    pub range: RunRange,
    /// Runs never posted.
    pub excluded: BTreeSet<u64>,
}

impl RunFilter {
    /// Creates a filter from optional bounds and an exclusion list.
    #[must_use]
    pub fn new(
        min_run: Option<u64>,
        max_run: Option<u64>,
        excluded: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self {
            range: RunRange::new(min_run, max_run),
            excluded: excluded.into_iter().collect(),
        }
    }

    /// Returns true when the run is not excluded.
    #[must_use]
    pub fn allows_run(&self, run_number: u64) -> bool {
        !self.excluded.contains(&run_number)
    }

    /// Returns true when the run passes both exclusion and range checks.
    #[must_use]
    pub fn accepts(&self, run_number: u64) -> bool {
        self.allows_run(run_number) && self.range.contains(run_number)
    }
}
