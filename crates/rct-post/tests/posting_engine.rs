// crates/rct-post/tests/posting_engine.rs
// ============================================================================
// Module: Posting Engine Tests
// Description: Tests for mode planning, throttling, dry-run, and accounting.
// Purpose: Ensure posts are attempted in order and every outcome is counted.
// Dependencies: rct-core, rct-post
// ============================================================================

//! ## Overview
//! Drives the posting engine with a recording sink and pauser, and checks
//! the three posting modes against a small fetched run set.

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

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::time::Duration;

use rct_core::DataPass;
use rct_core::DataPassId;
use rct_core::Detector;
use rct_core::DetectorId;
use rct_core::FlagPostRequest;
use rct_core::FlagSink;
use rct_core::FlagTypeId;
use rct_core::PostError;
use rct_core::Run;
use rct_post::BatchRow;
use rct_post::EngineSettings;
use rct_post::GlobalPlan;
use rct_post::IntervalEntry;
use rct_post::IntervalPlan;
use rct_post::Pauser;
use rct_post::PostingEngine;
use rct_post::PostingMode;
use rct_post::PostingTarget;
use rct_post::RunFilter;

// ============================================================================
// SECTION: Fakes
// ============================================================================

#[derive(Default)]
struct RecordingSink {
    posted: RefCell<Vec<FlagPostRequest>>,
    failing_runs: BTreeSet<u64>,
}

impl FlagSink for RecordingSink {
    fn post_flag(&self, request: &FlagPostRequest) -> Result<(), PostError> {
        self.posted.borrow_mut().push(request.clone());
        if self.failing_runs.contains(&request.run_number) {
            return Err(PostError::Status {
                status: 400,
                body: "rejected".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingPauser {
    pauses: Vec<Duration>,
}

impl Pauser for &mut RecordingPauser {
    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn data_pass() -> DataPass {
    DataPass {
        name: "LHC23zzh_apass4".to_string(),
        id: DataPassId::from_raw(17).unwrap(),
    }
}

fn detector() -> Detector {
    Detector::new("TPC", DetectorId::from_raw(4).unwrap())
}

fn runs() -> Vec<Run> {
    vec![
        Run::new(100, "TPC,ITS", []),
        Run::new(101, "ITS", []),
        Run::new(102, "TPC", []),
        Run::new(103, "TPC,FT0", []),
    ]
}

fn settings(dry_run: bool, throttle_n: u64) -> EngineSettings {
    EngineSettings {
        dry_run,
        dry_run_verbose: dry_run,
        throttle_n,
        throttle_sleep_secs: 2.5,
    }
}

fn request(run_number: u64) -> FlagPostRequest {
    FlagPostRequest {
        from: None,
        to: None,
        comment: Some("c".to_string()),
        flag_type_id: FlagTypeId::new(9),
        run_number,
        detector_id: detector().id,
        data_pass_id: data_pass().id,
    }
}

fn interval(run_number: u64, tmin: i64, tmax: i64, comment: Option<&str>) -> IntervalEntry {
    IntervalEntry {
        run_number,
        tmin,
        tmax,
        comment: comment.map(str::to_string),
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

#[test]
fn throttle_pauses_after_every_n_successes() {
    let sink = RecordingSink::default();
    let mut pauser = RecordingPauser::default();
    let mut engine = PostingEngine::new(&sink, settings(false, 3), &mut pauser);
    engine.submit_all((1..=10).map(request));
    let outcome = engine.finish();

    assert_eq!(outcome.ledger.total_processed(), 10);
    assert_eq!(sink.posted.borrow().len(), 10);
    assert_eq!(pauser.pauses, vec![Duration::from_millis(2_500); 3]);
}

#[test]
fn failures_do_not_advance_the_throttle() {
    let sink = RecordingSink {
        failing_runs: BTreeSet::from([2]),
        ..RecordingSink::default()
    };
    let mut pauser = RecordingPauser::default();
    let mut engine = PostingEngine::new(&sink, settings(false, 2), &mut pauser);
    assert!(engine.submit(request(1)));
    assert!(!engine.submit(request(2)));
    assert!(!engine.submit(request(2)));
    assert!(engine.submit(request(3)));
    let outcome = engine.finish();

    assert_eq!(pauser.pauses.len(), 1);
    assert_eq!(outcome.ledger.outcome(2).failed, 2);
    assert_eq!(outcome.ledger.outcome(2).attempted(), 2);
    assert_eq!(outcome.ledger.total_failed(), 2);
    let posted: Vec<u64> = outcome.posted.iter().map(|posted| posted.run_number).collect();
    assert_eq!(posted, vec![1, 3]);
}

#[test]
fn dry_run_never_calls_the_sink_or_sleeps() {
    let sink = RecordingSink {
        failing_runs: BTreeSet::from([1, 2, 3]),
        ..RecordingSink::default()
    };
    let mut pauser = RecordingPauser::default();
    let mut engine = PostingEngine::new(&sink, settings(true, 1), &mut pauser);
    engine.submit_all((1..=3).map(request));
    assert_eq!(engine.ledger().total_processed(), 3);
    let outcome = engine.finish();

    assert!(sink.posted.borrow().is_empty());
    assert!(pauser.pauses.is_empty());
    assert_eq!(outcome.ledger.total_failed(), 0);
}

#[test]
fn zero_throttle_disables_pausing() {
    let sink = RecordingSink::default();
    let mut pauser = RecordingPauser::default();
    let mut engine = PostingEngine::new(&sink, settings(false, 0), &mut pauser);
    engine.submit_all((1..=5).map(request));
    drop(engine.finish());
    assert!(pauser.pauses.is_empty());
}

// ============================================================================
// SECTION: Modes
// ============================================================================

#[test]
fn global_mode_filters_excluded_range_and_detector() {
    let pass = data_pass();
    let det = detector();
    let target = PostingTarget {
        data_pass: &pass,
        detector: &det,
    };
    let mode = PostingMode::Global(GlobalPlan {
        flag_type_id: FlagTypeId::new(7),
        comment: Some("bad tracking".to_string()),
        filter: RunFilter::new(Some(100), Some(102), [100]),
    });
    let planned = mode.plan(&target, &runs());

    assert_eq!(planned.len(), 1);
    let only = &planned[0];
    assert_eq!(only.run_number, 102);
    assert_eq!(only.flag_type_id, FlagTypeId::new(7));
    assert_eq!(only.comment.as_deref(), Some("bad tracking"));
    assert_eq!((only.from, only.to), (None, None));
    assert_eq!(only.detector_id, det.id);
    assert_eq!(only.data_pass_id, pass.id);
}

#[test]
fn batch_mode_skips_unknown_runs_without_detector_check() {
    let pass = data_pass();
    let det = detector();
    let target = PostingTarget {
        data_pass: &pass,
        detector: &det,
    };
    let rows = vec![
        BatchRow {
            run_number: 101,
            flag_type_id: FlagTypeId::new(9),
            comment: " ".to_string(),
        },
        BatchRow {
            run_number: 999,
            flag_type_id: FlagTypeId::new(9),
            comment: "missing".to_string(),
        },
        BatchRow {
            run_number: 100,
            flag_type_id: FlagTypeId::new(3),
            comment: "no data".to_string(),
        },
    ];
    let planned = PostingMode::Batch(rows).plan(&target, &runs());

    let summary: Vec<(u64, u32)> =
        planned.iter().map(|request| (request.run_number, request.flag_type_id.get())).collect();
    assert_eq!(summary, vec![(101, 9), (100, 3)]);
    assert_eq!(planned[0].comment.as_deref(), Some(" "));
}

#[test]
fn interval_mode_validates_widens_and_composes_comments() {
    let pass = data_pass();
    let det = detector();
    let target = PostingTarget {
        data_pass: &pass,
        detector: &det,
    };
    let mode = PostingMode::Interval(IntervalPlan {
        flag_type_id: FlagTypeId::new(5),
        comment: Some("shift".to_string()),
        filter: RunFilter::new(None, Some(102), [103]),
        entries: vec![
            interval(100, 1_000, 1_000, Some("spike")),
            interval(555, 1, 2, None),
            interval(101, 1, 2, None),
            interval(103, 1, 2, None),
            interval(102, 2_000, 3_000, None),
        ],
    });
    let planned = mode.plan(&target, &runs());

    assert_eq!(planned.len(), 2);
    assert_eq!(planned[0].run_number, 100);
    assert_eq!((planned[0].from, planned[0].to), (Some(1_000), Some(1_001)));
    assert_eq!(planned[0].comment.as_deref(), Some("shift | spike"));
    assert_eq!(planned[1].run_number, 102);
    assert_eq!((planned[1].from, planned[1].to), (Some(2_000), Some(3_000)));
    assert_eq!(planned[1].comment.as_deref(), Some("shift"));
}

#[test]
fn interval_mode_without_comments_uses_default() {
    let pass = data_pass();
    let det = detector();
    let target = PostingTarget {
        data_pass: &pass,
        detector: &det,
    };
    let mode = PostingMode::Interval(IntervalPlan {
        flag_type_id: FlagTypeId::new(5),
        comment: None,
        filter: RunFilter::default(),
        entries: vec![interval(102, 5, 6, None)],
    });
    let planned = mode.plan(&target, &runs());
    assert_eq!(planned[0].comment.as_deref(), Some("Interval flag"));
}
