// crates/rct-client/src/wire.rs
// ============================================================================
// Module: Service Wire Format
// Description: JSON shapes returned by the run/flag metadata service.
// Purpose: Decode `{ data: [...] }` envelopes into core records.
// Dependencies: rct-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Every listing endpoint answers with a `{ "data": [...] }` envelope; a
//! missing `data` key is an empty listing. Runs are decoded field by field so
//! unknown attributes survive as [`FieldValue`]s for report columns and
//! period fallback.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rct_core::EffectivePeriod;
use rct_core::FieldValue;
use rct_core::FlagTypeId;
use rct_core::QualityFlag;
use rct_core::Run;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Run attribute holding the run number.
const RUN_NUMBER_KEY: &str = "runNumber";
/// Run attribute holding the comma-joined detector list.
const DETECTORS_KEY: &str = "detectors";

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Listing envelope shared by every read endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Listed records; absent means none.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Data pass listing entry.
#[derive(Debug, Deserialize)]
pub struct WireDataPass {
    /// Data pass name.
    pub name: String,
    /// Service identifier.
    pub id: u64,
}

/// Flag type descriptor nested in a flag record.
#[derive(Debug, Deserialize)]
pub struct WireFlagType {
    /// Method name, for example `Good`.
    pub method: String,
}

/// Flag listing entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFlag {
    /// Flag type identifier.
    #[serde(default)]
    pub flag_type_id: Option<u32>,
    /// Flag type descriptor.
    pub flag_type: WireFlagType,
    /// Effective periods in service order.
    #[serde(default)]
    pub effective_periods: Vec<EffectivePeriod>,
}

impl From<WireFlag> for QualityFlag {
    fn from(flag: WireFlag) -> Self {
        let mut quality = Self::new(flag.flag_type.method, flag.effective_periods);
        quality.flag_type_id = flag.flag_type_id.map(FlagTypeId::new);
        quality
    }
}

// ============================================================================
// SECTION: Run Decoding
// ============================================================================

/// Decodes one run object.
///
/// # Errors
///
/// Returns a description when `runNumber` is missing or not an unsigned integer.
pub fn decode_run(mut object: Map<String, Value>) -> Result<Run, String> {
    let run_number = object
        .remove(RUN_NUMBER_KEY)
        .and_then(|value| value.as_u64())
        .ok_or_else(|| "run without an integer runNumber".to_string())?;
    let detectors = match object.remove(DETECTORS_KEY) {
        Some(Value::String(detectors)) => detectors,
        _ => String::new(),
    };
    let fields = object.into_iter().map(|(name, value)| {
        let value = FieldValue::from_json(&value);
        (name, value)
    });
    Ok(Run::new(run_number, &detectors, fields))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use rct_core::FieldValue;
    use serde_json::json;

    use super::Envelope;
    use super::WireFlag;
    use super::decode_run;

    #[test]
    fn run_fields_are_split_from_identity() {
        let object = json!({
            "runNumber": 544_013,
            "detectors": "ITS, TPC ,",
            "timeO2Start": 1_700_000_000_000_i64,
            "lastTfTimestamp": null,
            "runQuality": "good"
        })
        .as_object()
        .cloned()
        .expect("object");
        let run = decode_run(object).expect("decodes");
        assert_eq!(run.run_number, 544_013);
        assert_eq!(run.detectors_involved, vec!["ITS", "TPC"]);
        assert_eq!(run.field("lastTfTimestamp"), Some(&FieldValue::Null));
        assert_eq!(run.field("runQuality"), Some(&FieldValue::from("good")));
        assert!(run.field("runNumber").is_none());
    }

    #[test]
    fn run_without_number_is_rejected() {
        let object = json!({"detectors": "TPC"}).as_object().cloned().expect("object");
        assert!(decode_run(object).is_err());
    }

    #[test]
    fn missing_data_key_is_empty_listing() {
        let envelope: Envelope<WireFlag> = serde_json::from_str("{}").expect("decodes");
        assert!(envelope.data.is_empty());
    }
}
