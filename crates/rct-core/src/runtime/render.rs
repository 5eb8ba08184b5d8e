// crates/rct-core/src/runtime/render.rs
// ============================================================================
// Module: RCT Flag Renderer
// Description: Renders a detector's flag list for one run as report text.
// Purpose: Produce the per-detector cell of a run report.
// Dependencies: crate::core, crate::runtime::period
// ============================================================================

//! ## Overview
//! Every period of every flag becomes `"<method> (from: <from> to: <to>)"`,
//! joined with `" | "` in the order the service returned them. Sentinel
//! results render as their literal text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::FlagQueryResult;
use crate::core::Run;
use crate::runtime::period::resolve_effective_period;

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Separator between rendered periods in one cell.
pub const SEGMENT_SEPARATOR: &str = " | ";

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Convert numeric endpoints to the display time format.
    pub convert_time: bool,
}

/// Renders a flag query result for the owning run.
#[must_use]
pub fn render_flags(result: &FlagQueryResult, run: &Run, options: RenderOptions) -> String {
    let flags = match result {
        FlagQueryResult::Flags(flags) => flags,
        sentinel => return sentinel.sentinel().unwrap_or_default().to_string(),
    };
    let mut segments = Vec::new();
    for flag in flags {
        for period in &flag.effective_periods {
            let resolved = resolve_effective_period(period, run);
            let (from, to) = if options.convert_time {
                (resolved.from.to_display_time(), resolved.to.to_display_time())
            } else {
                (resolved.from, resolved.to)
            };
            segments.push(format!("{} (from: {from} to: {to})", flag.method));
        }
    }
    segments.join(SEGMENT_SEPARATOR)
}
