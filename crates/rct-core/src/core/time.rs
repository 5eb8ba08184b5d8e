// crates/rct-core/src/core/time.rs
// ============================================================================
// Module: RCT Display Time
// Description: Millisecond epoch to display string conversion.
// Purpose: Render service timestamps as `YYYY-MM-DD HH:MM:SS` (UTC).
// Dependencies: time
// ============================================================================

//! ## Overview
//! Service timestamps are millisecond epoch values. Reports may show them in
//! a fixed UTC display format. Conversion never fails the caller: values out
//! of the representable range fall back to their plain numeric form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ::time::OffsetDateTime;
use ::time::format_description::BorrowedFormatItem;
use ::time::macros::format_description;
use serde_json::Number;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Display layout for converted timestamps.
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: i128 = 1_000_000;

// ============================================================================
// SECTION: Conversion
// ============================================================================

/// Converts a millisecond epoch number to the UTC display format.
///
/// Returns `None` when the value is not finite or outside the supported
/// calendar range; callers keep the numeric form in that case.
#[must_use]
pub fn millis_to_display(millis: &Number) -> Option<String> {
    let nanos = millis_to_nanos(millis)?;
    let datetime = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
    datetime.format(DISPLAY_FORMAT).ok()
}

/// Widens a JSON number holding milliseconds into epoch nanoseconds.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Float milliseconds are bounded by the finite check and the calendar range check."
)]
fn millis_to_nanos(millis: &Number) -> Option<i128> {
    if let Some(value) = millis.as_i64() {
        return i128::from(value).checked_mul(NANOS_PER_MILLI);
    }
    if let Some(value) = millis.as_u64() {
        return i128::from(value).checked_mul(NANOS_PER_MILLI);
    }
    let value = millis.as_f64()?;
    let nanos = value * 1_000_000.0;
    if !nanos.is_finite() || nanos.abs() > 1.0e30 {
        return None;
    }
    Some(nanos as i128)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
