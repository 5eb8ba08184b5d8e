// crates/rct-core/src/core/flags.rs
// ============================================================================
// Module: RCT Quality Flags
// Description: Quality flags, effective periods, and flag query results.
// Purpose: Model per run/detector quality assessments for a data pass.
// Dependencies: serde, crate::core::identifiers
// ============================================================================

//! ## Overview
//! A [`QualityFlag`] assesses one run and detector for a data pass over one
//! or more [`EffectivePeriod`]s. A flag query either yields flags or one of
//! two terminal sentinels that render verbatim and are never resolved.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;

use crate::core::identifiers::FlagTypeId;

// ============================================================================
// SECTION: Sentinels
// ============================================================================

/// Rendered when the service returned no flags for a run/detector pair.
pub const NOT_AVAILABLE: &str = "Not Available";
/// Rendered when the detector is absent from the run.
pub const NOT_PRESENT: &str = "Not Present";

// ============================================================================
// SECTION: Flag Types
// ============================================================================

/// Time window over which a flag applies (millisecond epoch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct EffectivePeriod {
    /// Window start; `None` when the service left it open.
    #[serde(default)]
    pub from: Option<i64>,
    /// Window end; `None` when the service left it open.
    #[serde(default)]
    pub to: Option<i64>,
}

impl EffectivePeriod {
    /// Creates a period from optional endpoints.
    #[must_use]
    pub const fn new(from: Option<i64>, to: Option<i64>) -> Self {
        Self {
            from,
            to,
        }
    }
}

/// One quality assessment of a run and detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityFlag {
    /// Flag type identifier, when reported.
    pub flag_type_id: Option<FlagTypeId>,
    /// Flag type method name (for example `Good` or `BadTracking`).
    pub method: String,
    /// Effective periods in service order.
    pub effective_periods: Vec<EffectivePeriod>,
}

impl QualityFlag {
    /// Creates a flag with the given method and periods.
    #[must_use]
    pub fn new(method: impl Into<String>, effective_periods: Vec<EffectivePeriod>) -> Self {
        Self {
            flag_type_id: None,
            method: method.into(),
            effective_periods,
        }
    }
}

/// Result of a flag query for one run/detector pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagQueryResult {
    /// The service has no flags at all for the pair.
    NotAvailable,
    /// The detector did not take part in the run.
    NotPresent,
    /// Flags carrying at least one effective period, in service order.
    Flags(Vec<QualityFlag>),
}

impl FlagQueryResult {
    /// Builds a result from the raw service flag list.
    ///
    /// An empty list maps to [`FlagQueryResult::NotAvailable`]; otherwise
    /// flags without effective periods are dropped.
    #[must_use]
    pub fn from_service_flags(flags: Vec<QualityFlag>) -> Self {
        if flags.is_empty() {
            return Self::NotAvailable;
        }
        Self::Flags(flags.into_iter().filter(|flag| !flag.effective_periods.is_empty()).collect())
    }

    /// Returns the sentinel text for terminal results.
    #[must_use]
    pub const fn sentinel(&self) -> Option<&'static str> {
        match self {
            Self::NotAvailable => Some(NOT_AVAILABLE),
            Self::NotPresent => Some(NOT_PRESENT),
            Self::Flags(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
