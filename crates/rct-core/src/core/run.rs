// crates/rct-core/src/core/run.rs
// ============================================================================
// Module: RCT Run Records
// Description: Run records, field values, and run-number ranges.
// Purpose: Model one data-taking session as returned by the run service.
// Dependencies: serde_json, crate::core::time
// ============================================================================

//! ## Overview
//! A [`Run`] carries its run number, the list of involved detectors, and the
//! remaining service attributes as [`FieldValue`]s. Timestamp attributes are
//! millisecond epoch numbers or the sentinel `"N/A"`.
//! Invariants:
//! - Run numbers are unique within one data pass fetch.
//! - Runs are never mutated after fetch except by [`Run::decorate`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Number;
use serde_json::Value;

use crate::core::time::millis_to_display;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel used by the service and reports for unavailable values.
pub const NOT_AVAILABLE_VALUE: &str = "N/A";

/// Extra per-run report columns, in fixed column order.
pub const EXTRA_RUN_FIELDS: [&str; 11] = [
    "timeO2Start",
    "timeO2End",
    "timeTrgStart",
    "timeTrgEnd",
    "firstTfTimestamp",
    "lastTfTimestamp",
    "inelasticInteractionRateAvg",
    "inelasticInteractionRateAtStart",
    "inelasticInteractionRateAtMid",
    "inelasticInteractionRateAtEnd",
    "muInelasticInteractionRate",
];

/// Run attributes holding millisecond epoch timestamps.
pub const MILLIS_TIME_FIELDS: [&str; 6] = [
    "timeO2Start",
    "timeO2End",
    "timeTrgStart",
    "timeTrgEnd",
    "firstTfTimestamp",
    "lastTfTimestamp",
];

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// A single run attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// JSON `null` reported by the service.
    Null,
    /// The `"N/A"` sentinel (reported or substituted for absent fields).
    NotAvailable,
    /// Numeric value (timestamps are millisecond epochs).
    Number(Number),
    /// Any other textual value, including converted display timestamps.
    Text(String),
}

impl FieldValue {
    /// Decodes a service JSON value.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Number(number) => Self::Number(number.clone()),
            Value::String(text) if text == NOT_AVAILABLE_VALUE => Self::NotAvailable,
            Value::String(text) => Self::Text(text.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    /// Returns true when the value is neither null nor the `"N/A"` sentinel.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        !matches!(self, Self::Null | Self::NotAvailable)
    }

    /// Converts a millisecond epoch value to the display time format.
    ///
    /// Text values and sentinels pass through unchanged (null becomes
    /// `"N/A"`), so converting twice yields the same value. Numbers outside
    /// the calendar range fall back to their string form.
    #[must_use]
    pub fn to_display_time(&self) -> Self {
        match self {
            Self::Null | Self::NotAvailable => Self::NotAvailable,
            Self::Number(number) => {
                Self::Text(millis_to_display(number).unwrap_or_else(|| number.to_string()))
            }
            Self::Text(text) => Self::Text(text.clone()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE_VALUE),
            Self::Number(number) => number.fmt(f),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        if value == NOT_AVAILABLE_VALUE {
            Self::NotAvailable
        } else {
            Self::Text(value.to_string())
        }
    }
}

// ============================================================================
// SECTION: Runs
// ============================================================================

/// Options applied while fetching runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFetchOptions {
    /// Fields guaranteed to exist on every run after decoration.
    pub extra_fields: Vec<String>,
    /// Convert millisecond time fields to display strings.
    pub convert_time: bool,
}

impl RunFetchOptions {
    /// Options used by reports: all extra columns, optional time conversion.
    #[must_use]
    pub fn report(convert_time: bool) -> Self {
        Self {
            extra_fields: EXTRA_RUN_FIELDS.iter().map(ToString::to_string).collect(),
            convert_time,
        }
    }
}

/// One data-taking session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Unique run number.
    pub run_number: u64,
    /// Detector names involved in the run, in service order.
    pub detectors_involved: Vec<String>,
    /// Remaining service attributes keyed by field name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Run {
    /// Creates a run from its number, raw comma-joined detector list, and fields.
    #[must_use]
    pub fn new(
        run_number: u64,
        detectors: &str,
        fields: impl IntoIterator<Item = (String, FieldValue)>,
    ) -> Self {
        Self {
            run_number,
            detectors_involved: parse_detector_list(detectors),
            fields: fields.into_iter().collect(),
        }
    }

    /// Returns true when the named detector took part in the run.
    #[must_use]
    pub fn involves(&self, detector: &str) -> bool {
        self.detectors_involved.iter().any(|name| name == detector)
    }

    /// Returns a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the field value when present and usable.
    #[must_use]
    pub fn usable_field(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).filter(|value| value.is_usable())
    }

    /// Adds missing extra fields as `"N/A"` and optionally converts time fields.
    pub fn decorate(&mut self, options: &RunFetchOptions) {
        for name in &options.extra_fields {
            match self.fields.get_mut(name) {
                None => {
                    self.fields.insert(name.clone(), FieldValue::NotAvailable);
                }
                Some(value) if options.convert_time && is_millis_time_field(name) => {
                    *value = value.to_display_time();
                }
                Some(_) => {}
            }
        }
    }
}

/// Splits a comma-joined detector string into trimmed, non-empty names.
#[must_use]
pub fn parse_detector_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_string).collect()
}

/// Returns true for run attributes that hold millisecond timestamps.
#[must_use]
pub fn is_millis_time_field(name: &str) -> bool {
    MILLIS_TIME_FIELDS.contains(&name)
}

// ============================================================================
// SECTION: Run Ranges
// ============================================================================

/// Inclusive run-number range; either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunRange {
    /// Lowest accepted run number.
    pub lo: Option<u64>,
    /// Highest accepted run number.
    pub hi: Option<u64>,
}

impl RunRange {
    /// Creates a range from optional bounds.
    #[must_use]
    pub const fn new(lo: Option<u64>, hi: Option<u64>) -> Self {
        Self {
            lo,
            hi,
        }
    }

    /// Returns true when the run number lies inside the range.
    #[must_use]
    pub fn contains(&self, run_number: u64) -> bool {
        self.lo.is_none_or(|lo| run_number >= lo) && self.hi.is_none_or(|hi| run_number <= hi)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::FieldValue;
    use super::Run;
    use super::RunFetchOptions;
    use super::RunRange;
    use super::parse_detector_list;

    #[test]
    fn detector_list_trims_and_drops_empty_entries() {
        assert_eq!(parse_detector_list(" TPC, ITS ,,TOF"), vec!["TPC", "ITS", "TOF"]);
        assert!(parse_detector_list("").is_empty());
    }

    #[test]
    fn decorate_fills_missing_fields_with_sentinel() {
        let mut run = Run::new(7, "TPC", [("timeO2Start".to_string(), FieldValue::from(0))]);
        run.decorate(&RunFetchOptions::report(false));
        assert_eq!(run.field("timeO2Start"), Some(&FieldValue::from(0)));
        assert_eq!(run.field("muInelasticInteractionRate"), Some(&FieldValue::NotAvailable));
        assert_eq!(run.fields.len(), 11);
    }

    #[test]
    fn decorate_converts_only_time_fields() {
        let mut run = Run::new(
            7,
            "TPC",
            [
                ("timeO2Start".to_string(), FieldValue::from(0)),
                ("inelasticInteractionRateAvg".to_string(), FieldValue::from(42)),
                ("timeTrgEnd".to_string(), FieldValue::from("N/A")),
            ],
        );
        run.decorate(&RunFetchOptions::report(true));
        assert_eq!(run.field("timeO2Start"), Some(&FieldValue::Text("1970-01-01 00:00:00".into())));
        assert_eq!(run.field("inelasticInteractionRateAvg"), Some(&FieldValue::from(42)));
        assert_eq!(run.field("timeTrgEnd"), Some(&FieldValue::NotAvailable));
    }

    #[test]
    fn field_value_decodes_json_kinds() {
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!("N/A")), FieldValue::NotAvailable);
        assert_eq!(FieldValue::from_json(&json!(12)), FieldValue::from(12));
        assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::Text("true".into()));
        assert_eq!(FieldValue::from_json(&json!(1.5)).to_string(), "1.5");
    }

    #[test]
    fn display_time_conversion_is_idempotent() {
        let once = FieldValue::from(1_000).to_display_time();
        assert_eq!(once.to_display_time(), once);
        assert_eq!(FieldValue::Null.to_display_time(), FieldValue::NotAvailable);
    }

    #[test]
    fn run_range_bounds_are_inclusive() {
        let range = RunRange::new(Some(10), Some(20));
        assert!(range.contains(10));
        assert!(range.contains(20));
        assert!(!range.contains(9));
        assert!(!range.contains(21));
        assert!(RunRange::default().contains(0));
        assert!(RunRange::new(None, Some(5)).contains(1));
    }
}
