// crates/rct-core/src/runtime/period.rs
// ============================================================================
// Module: RCT Period Resolver
// Description: Fills missing effective-period endpoints from run timing.
// Purpose: Produce a displayable window for every flag period.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Flags may leave a period endpoint open. Open periods are closed with the
//! first fully usable pair from [`PERIOD_FALLBACK_CHAIN`], consulted strictly
//! in order: timeframe boundaries, then trigger timing, then O2 timing.
//! Invariants:
//! - A period with both endpoints present is returned unchanged.
//! - A fallback pair is used only when both of its members are usable.
//! - Without a usable pair, present endpoints are kept and missing ones
//!   become `"N/A"`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::EffectivePeriod;
use crate::core::FieldValue;
use crate::core::Run;

// ============================================================================
// SECTION: Fallback Chain
// ============================================================================

/// Start/end run attributes consulted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPair {
    /// Run attribute supplying the window start.
    pub start: &'static str,
    /// Run attribute supplying the window end.
    pub end: &'static str,
}

/// Ordered fallback pairs, most precise timing source first.
pub const PERIOD_FALLBACK_CHAIN: [FallbackPair; 3] = [
    FallbackPair {
        start: "firstTfTimestamp",
        end: "lastTfTimestamp",
    },
    FallbackPair {
        start: "timeTrgStart",
        end: "timeTrgEnd",
    },
    FallbackPair {
        start: "timeO2Start",
        end: "timeO2End",
    },
];

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Where a resolved window came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSource {
    /// Both endpoints were set on the flag.
    Flag,
    /// Both endpoints were taken from this run attribute pair.
    Run(FallbackPair),
    /// No usable pair; missing endpoints were replaced by `"N/A"`.
    Unresolved,
}

/// A window with both endpoints filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPeriod {
    /// Window start.
    pub from: FieldValue,
    /// Window end.
    pub to: FieldValue,
    /// Origin of the endpoints.
    pub source: PeriodSource,
}

/// Resolves a candidate window against the owning run.
#[must_use]
pub fn resolve_period(
    from: Option<FieldValue>,
    to: Option<FieldValue>,
    run: &Run,
) -> ResolvedPeriod {
    if let (Some(from), Some(to)) = (&from, &to) {
        return ResolvedPeriod {
            from: from.clone(),
            to: to.clone(),
            source: PeriodSource::Flag,
        };
    }
    for pair in PERIOD_FALLBACK_CHAIN {
        if let (Some(start), Some(end)) = (run.usable_field(pair.start), run.usable_field(pair.end))
        {
            return ResolvedPeriod {
                from: start.clone(),
                to: end.clone(),
                source: PeriodSource::Run(pair),
            };
        }
    }
    ResolvedPeriod {
        from: from.unwrap_or(FieldValue::NotAvailable),
        to: to.unwrap_or(FieldValue::NotAvailable),
        source: PeriodSource::Unresolved,
    }
}

/// Resolves a flag's effective period against the owning run.
#[must_use]
pub fn resolve_effective_period(period: &EffectivePeriod, run: &Run) -> ResolvedPeriod {
    resolve_period(period.from.map(FieldValue::from), period.to.map(FieldValue::from), run)
}
