// crates/rct-core/src/core/posting.rs
// ============================================================================
// Module: RCT Flag Post Requests
// Description: Wire payload for writing one quality flag.
// Purpose: Describe a single flag write independent of transport.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! [`FlagPostRequest`] is the JSON body posted to the flag endpoint. Absent
//! window endpoints and comments serialize as `null` so the service applies
//! its own run-wide defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::identifiers::DataPassId;
use crate::core::identifiers::DetectorId;
use crate::core::identifiers::FlagTypeId;

// ============================================================================
// SECTION: Request
// ============================================================================

/// One flag write for a run, detector, and data pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagPostRequest {
    /// Window start in milliseconds (`None` = whole run).
    pub from: Option<i64>,
    /// Window end in milliseconds (`None` = whole run).
    pub to: Option<i64>,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Quality classification to post.
    pub flag_type_id: FlagTypeId,
    /// Target run number.
    pub run_number: u64,
    /// Target detector.
    #[serde(rename = "dplDetectorId")]
    pub detector_id: DetectorId,
    /// Target data pass.
    pub data_pass_id: DataPassId,
}

/// Renders an optional endpoint the way diagnostics show it.
fn optional_label<T: fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "None".to_string(), ToString::to_string)
}

impl fmt::Display for FlagPostRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run={} flagTypeId={} from={} to={} comment={}",
            self.run_number,
            self.flag_type_id,
            optional_label(self.from.as_ref()),
            optional_label(self.to.as_ref()),
            optional_label(self.comment.as_ref()),
        )
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
