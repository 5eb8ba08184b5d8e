// crates/rct-core/src/core/mod.rs
// ============================================================================
// Module: RCT Core Types
// Description: Data model shared by the report and posting pipelines.
// Purpose: Group identifiers, run records, flags, and time helpers.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types are plain data. They are produced by a [`crate::MetadataSource`]
//! once per invocation and never mutated afterwards, apart from run
//! decoration with extra display fields.

pub mod flags;
pub mod identifiers;
pub mod posting;
pub mod run;
pub mod time;

pub use flags::EffectivePeriod;
pub use flags::FlagQueryResult;
pub use flags::NOT_AVAILABLE;
pub use flags::NOT_PRESENT;
pub use flags::QualityFlag;
pub use identifiers::DataPass;
pub use identifiers::DataPassId;
pub use identifiers::Detector;
pub use identifiers::DetectorId;
pub use identifiers::FlagTypeId;
pub use posting::FlagPostRequest;
pub use run::EXTRA_RUN_FIELDS;
pub use run::FieldValue;
pub use run::MILLIS_TIME_FIELDS;
pub use run::NOT_AVAILABLE_VALUE;
pub use run::Run;
pub use run::RunFetchOptions;
pub use run::RunRange;
pub use time::millis_to_display;
