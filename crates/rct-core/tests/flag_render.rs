// crates/rct-core/tests/flag_render.rs
// ============================================================================
// Module: Flag Renderer Tests
// Description: Tests for per-detector flag cell rendering.
// Purpose: Ensure sentinels, ordering, and time conversion render stably.
// Dependencies: rct-core
// ============================================================================

//! ## Overview
//! Validates sentinel propagation, segment joining in service order, and that
//! rendering already-converted data is stable across repeated calls.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use rct_core::EffectivePeriod;
use rct_core::FieldValue;
use rct_core::FlagQueryResult;
use rct_core::QualityFlag;
use rct_core::RenderOptions;
use rct_core::Run;
use rct_core::RunFetchOptions;
use rct_core::render_flags;

fn timed_run() -> Run {
    Run::new(
        100,
        "TPC,ITS",
        [
            ("firstTfTimestamp".to_string(), FieldValue::from(5_000)),
            ("lastTfTimestamp".to_string(), FieldValue::from(6_000)),
        ],
    )
}

#[test]
fn sentinels_render_verbatim() {
    let run = timed_run();
    let options = RenderOptions {
        convert_time: true,
    };
    assert_eq!(render_flags(&FlagQueryResult::NotPresent, &run, options), "Not Present");
    assert_eq!(render_flags(&FlagQueryResult::NotAvailable, &run, options), "Not Available");
    let bare = Run::new(1, "", []);
    assert_eq!(render_flags(&FlagQueryResult::NotPresent, &bare, options), "Not Present");
}

#[test]
fn open_period_renders_with_run_timeframe() {
    let flags =
        FlagQueryResult::Flags(vec![QualityFlag::new("Good", vec![EffectivePeriod::default()])]);
    assert_eq!(
        render_flags(&flags, &timed_run(), RenderOptions::default()),
        "Good (from: 5000 to: 6000)"
    );
}

#[test]
fn segments_follow_service_order() {
    let flags = FlagQueryResult::Flags(vec![
        QualityFlag::new(
            "BadTracking",
            vec![
                EffectivePeriod::new(Some(5_100), Some(5_200)),
                EffectivePeriod::new(Some(5_000), Some(5_050)),
            ],
        ),
        QualityFlag::new("Good", vec![EffectivePeriod::new(Some(5_300), None)]),
    ]);
    assert_eq!(
        render_flags(&flags, &timed_run(), RenderOptions::default()),
        "BadTracking (from: 5100 to: 5200) | BadTracking (from: 5000 to: 5050) | Good (from: 5000 \
         to: 6000)"
    );
}

#[test]
fn converted_rendering_is_stable_across_calls() {
    let mut run = timed_run();
    run.decorate(&RunFetchOptions::report(true));
    let flags = FlagQueryResult::Flags(vec![QualityFlag::new(
        "Good",
        vec![EffectivePeriod::default(), EffectivePeriod::new(Some(0), Some(1_000))],
    )]);
    let options = RenderOptions {
        convert_time: true,
    };
    let first = render_flags(&flags, &run, options);
    let second = render_flags(&flags, &run, options);
    assert_eq!(first, second);
    assert_eq!(
        first,
        "Good (from: 1970-01-01 00:00:05 to: 1970-01-01 00:00:06) | Good (from: 1970-01-01 \
         00:00:00 to: 1970-01-01 00:00:01)"
    );
}

#[test]
fn empty_flag_list_renders_empty_cell() {
    assert_eq!(
        render_flags(&FlagQueryResult::Flags(Vec::new()), &timed_run(), RenderOptions::default()),
        ""
    );
}
