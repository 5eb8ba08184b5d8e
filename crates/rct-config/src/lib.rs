// crates/rct-config/src/lib.rs
// ============================================================================
// Module: RCT Config Library
// Description: Canonical config model and validation for the rct tools.
// Purpose: Single source of truth for service endpoints, detectors, passes.
// Dependencies: rct-core, serde, serde_json, toml
// ============================================================================

//! ## Overview
//! `rct-config` loads the JSON or TOML configuration shared by the report and
//! post commands and validates it fail-closed before any network call.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod ordered;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use ordered::OrderedMap;
