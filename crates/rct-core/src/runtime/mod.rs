// crates/rct-core/src/runtime/mod.rs
// ============================================================================
// Module: RCT Runtime
// Description: Period resolution and flag rendering.
// Purpose: Turn fetched flags into report text.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Runtime helpers are pure functions over fetched data. They are used only
//! by the read path; the posting pipeline never resolves periods.

pub mod period;
pub mod render;

pub use period::FallbackPair;
pub use period::PERIOD_FALLBACK_CHAIN;
pub use period::PeriodSource;
pub use period::ResolvedPeriod;
pub use period::resolve_effective_period;
pub use period::resolve_period;
pub use render::RenderOptions;
pub use render::render_flags;
