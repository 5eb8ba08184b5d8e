// crates/rct-core/src/lib.rs
// ============================================================================
// Module: RCT Core Library
// Description: Public API surface for the run condition table core.
// Purpose: Expose the data model, interfaces, and period/flag rendering logic.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! RCT core models data passes, runs, detectors, and quality flags as returned
//! by the run/flag metadata service. It resolves missing effective-period
//! endpoints through a fixed fallback chain and renders flag lists for
//! reports. Network access lives behind the [`MetadataSource`] and
//! [`FlagSink`] interfaces so every consumer can be exercised offline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::FlagSink;
pub use interfaces::MetadataError;
pub use interfaces::MetadataSource;
pub use interfaces::PostError;
pub use runtime::FallbackPair;
pub use runtime::PERIOD_FALLBACK_CHAIN;
pub use runtime::PeriodSource;
pub use runtime::RenderOptions;
pub use runtime::ResolvedPeriod;
pub use runtime::render_flags;
pub use runtime::resolve_effective_period;
pub use runtime::resolve_period;
