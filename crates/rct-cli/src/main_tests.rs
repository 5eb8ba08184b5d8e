// crates/rct-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, mode selection, and posting runs.
// Purpose: Ensure incompatible flag combinations fail before any network call.
// Dependencies: clap, rct-config, rct-core, rct-post, tempfile, rct-cli main helpers
// ============================================================================

//! ## Overview
//! Parses command lines through the real clap definition and checks mode
//! selection, throttle overrides, and report target listing. Posting runs
//! go through an in-memory service standing in for both the metadata reads
//! and the flag writes.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rct_config::RctConfig;
use rct_core::DataPass;
use rct_core::DataPassId;
use rct_core::DetectorId;
use rct_core::FlagPostRequest;
use rct_core::FlagQueryResult;
use rct_core::FlagSink;
use rct_core::FlagTypeId;
use rct_core::MetadataError;
use rct_core::MetadataSource;
use rct_core::PostError;
use rct_core::Run;
use rct_core::RunFetchOptions;
use rct_core::RunRange;
use rct_post::BatchRow;
use rct_post::EngineSettings;
use rct_post::GlobalPlan;
use rct_post::Pauser;
use rct_post::PostingMode;
use rct_post::RunFilter;

use super::Cli;
use super::Commands;
use super::ModeSelection;
use super::PostArgs;
use super::PostJob;
use super::engine_settings;
use super::execute_post;
use super::report_targets;
use super::resolve_data_passes;
use super::resolve_detector;
use super::select_mode;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const CONFIG: &str = r#"{
    "run_api_url": "https://ali-bookkeeping.example.org/api",
    "flag_api_url": "https://ali-bookkeeping.example.org/api/qcFlags",
    "token": "secret-token",
    "detector_ids": {"TPC": 4, "ITS": 1},
    "dataPassNames": {
        "LHC23zzh_apass4": {"run_range": [544000, null]},
        "LHC24af_apass1": {}
    },
    "posting": {"throttle_n": 50, "throttle_sleep_secs": 1.5}
}"#;

fn config() -> RctConfig {
    RctConfig::from_json_str(CONFIG).unwrap()
}

fn post_args(extra: &[&str]) -> PostArgs {
    let mut argv = vec!["rct", "post", "rct.json", "--data-pass", "LHC23zzh_apass4", "--detector", "TPC"];
    argv.extend_from_slice(extra);
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Post(args) => args,
        Commands::Report(_) => panic!("expected post command"),
    }
}

fn rejection(extra: &[&str]) -> String {
    select_mode(&post_args(extra)).unwrap_err().to_string()
}

/// In-memory run service serving listings and accepting flag writes.
struct FakeService {
    passes: Vec<DataPass>,
    runs: Vec<Run>,
    failing_runs: BTreeSet<u64>,
    listings: Cell<usize>,
    posted: RefCell<Vec<u64>>,
}

impl FakeService {
    fn new(runs: &[u64]) -> Self {
        Self {
            passes: vec![pass("LHC23zzh_apass4", 7), pass("LHC24af_apass1", 9)],
            runs: runs.iter().map(|run| Run::new(*run, "TPC,ITS", [])).collect(),
            failing_runs: BTreeSet::new(),
            listings: Cell::new(0),
            posted: RefCell::new(Vec::new()),
        }
    }
}

impl MetadataSource for FakeService {
    fn list_data_passes(&self) -> Result<Vec<DataPass>, MetadataError> {
        self.listings.set(self.listings.get() + 1);
        Ok(self.passes.clone())
    }

    fn fetch_runs(
        &self,
        _data_pass: DataPassId,
        _options: &RunFetchOptions,
    ) -> Result<Vec<Run>, MetadataError> {
        Ok(self.runs.clone())
    }

    fn fetch_flags(
        &self,
        _data_pass: DataPassId,
        _run_number: u64,
        _detector: DetectorId,
    ) -> Result<FlagQueryResult, MetadataError> {
        Ok(FlagQueryResult::NotAvailable)
    }
}

impl FlagSink for FakeService {
    fn post_flag(&self, request: &FlagPostRequest) -> Result<(), PostError> {
        if self.failing_runs.contains(&request.run_number) {
            return Err(PostError::Status {
                status: 500,
                body: "backend down".to_string(),
            });
        }
        self.posted.borrow_mut().push(request.run_number);
        Ok(())
    }
}

/// Pauser counting pauses instead of sleeping.
struct CountingPauser<'a>(&'a Cell<usize>);

impl Pauser for CountingPauser<'_> {
    fn pause(&mut self, _duration: Duration) {
        self.0.set(self.0.get() + 1);
    }
}

fn pass(name: &str, id: u64) -> DataPass {
    DataPass {
        name: name.to_string(),
        id: DataPassId::from_raw(id).unwrap(),
    }
}

fn settings(throttle_n: u64, dry_run: bool) -> EngineSettings {
    EngineSettings {
        dry_run,
        dry_run_verbose: false,
        throttle_n,
        throttle_sleep_secs: 0.0,
    }
}

fn global_mode() -> PostingMode {
    PostingMode::Global(GlobalPlan {
        flag_type_id: FlagTypeId::new(9),
        comment: None,
        filter: RunFilter::new(None, None, []),
    })
}

fn batch_row(run_number: u64, flag_type_id: u32) -> BatchRow {
    BatchRow {
        run_number,
        flag_type_id: FlagTypeId::new(flag_type_id),
        comment: " ".to_string(),
    }
}

// ============================================================================
// SECTION: Mode Selection
// ============================================================================

#[test]
fn global_mode_requires_flag_type() {
    assert_eq!(
        select_mode(&post_args(&["--flag-type-id", "9"])).unwrap(),
        ModeSelection::Global(FlagTypeId::new(9))
    );
    assert_eq!(rejection(&[]), "--flag-type-id is required in global mode");
    assert_eq!(
        rejection(&["--flag-type-id", "9", "--minutes", "m.txt"]),
        "--minutes can be used only in batch mode"
    );
    assert_eq!(
        rejection(&["--flag-type-id", "9", "--no-diff"]),
        "--no-diff can be used only in batch mode"
    );
}

#[test]
fn batch_mode_rejects_run_scoped_flags() {
    assert_eq!(
        select_mode(&post_args(&["-b", "runs.csv", "--minutes", "m.txt", "--no-diff"])).unwrap(),
        ModeSelection::Batch(PathBuf::from("runs.csv"))
    );
    for extra in [
        &["--min-run", "5"][..],
        &["--max-run", "5"][..],
        &["--excluded-runs", "1", "2"][..],
        &["--comment", "x"][..],
        &["--flag-type-id", "9"][..],
    ] {
        let mut argv = vec!["--batch", "runs.csv"];
        argv.extend_from_slice(extra);
        assert!(rejection(&argv).contains("cannot be used with -b/--batch"));
    }
    assert_eq!(
        rejection(&["-b", "runs.csv", "--no-diff"]),
        "--no-diff can be used only if --minutes is used"
    );
}

#[test]
fn interval_mode_rules() {
    assert_eq!(
        select_mode(&post_args(&["--interval-file", "i.txt", "--flag-type-id", "5"])).unwrap(),
        ModeSelection::Interval(PathBuf::from("i.txt"), FlagTypeId::new(5))
    );
    assert_eq!(
        rejection(&["--interval-file", "i.txt"]),
        "--flag-type-id is required when using --interval-file"
    );
    assert_eq!(
        rejection(&["--interval-file", "i.txt", "--flag-type-id", "5", "--minutes", "m.txt"]),
        "--minutes can be used only in batch mode, not with --interval-file"
    );
    assert_eq!(
        rejection(&["--interval-file", "i.txt", "-b", "runs.csv"]),
        "--interval-file cannot be used together with -b/--batch"
    );
}

#[test]
fn underscore_aliases_are_accepted() {
    let args = post_args(&["--flagTypeId", "7", "--min_run", "10", "--excluded_runs", "11", "12"]);
    assert_eq!(args.flag_type_id, Some(7));
    assert_eq!(args.min_run, Some(10));
    assert_eq!(args.excluded_runs, vec![11, 12]);
}

// ============================================================================
// SECTION: Settings and Targets
// ============================================================================

#[test]
fn throttle_flags_override_configuration() {
    let config = config();
    let defaults = engine_settings(&post_args(&["--flag-type-id", "9"]), &config).unwrap();
    assert_eq!(defaults.throttle_n, 50);
    assert!((defaults.throttle_sleep_secs - 1.5).abs() < f64::EPSILON);

    let overridden = engine_settings(
        &post_args(&["--flag-type-id", "9", "--throttle-n", "0", "--throttle-sleep", "3", "--dry-run"]),
        &config,
    )
    .unwrap();
    assert_eq!(overridden.throttle_n, 0);
    assert!((overridden.throttle_sleep_secs - 3.0).abs() < f64::EPSILON);
    assert!(overridden.dry_run);

    let invalid = engine_settings(
        &post_args(&["--flag-type-id", "9", "--throttle-sleep=-1"]),
        &config,
    );
    assert!(invalid.is_err());
}

#[test]
fn report_targets_follow_configuration_order() {
    let config = config();
    let all = report_targets(&config, None).unwrap();
    assert_eq!(
        all,
        vec![
            ("LHC23zzh_apass4".to_string(), RunRange::new(Some(544_000), None)),
            ("LHC24af_apass1".to_string(), RunRange::default()),
        ]
    );
    let only = report_targets(&config, Some("LHC22o_apass7")).unwrap();
    assert_eq!(only, vec![("LHC22o_apass7".to_string(), RunRange::default())]);
}

#[test]
fn unknown_detector_is_fatal() {
    let err = resolve_detector(&config(), "ZDC").unwrap_err();
    assert_eq!(err.to_string(), "No detector ID found for ZDC");
    assert_eq!(resolve_detector(&config(), "ITS").unwrap().name, "ITS");
}

#[test]
fn report_data_passes_resolve_from_one_listing() {
    let service = FakeService::new(&[]);
    let resolved = resolve_data_passes(&service, &["LHC24af_apass1", "LHC23zzh_apass4"]).unwrap();
    let ids: Vec<u64> = resolved.iter().map(|pass| pass.id.get()).collect();
    assert_eq!(ids, vec![9, 7]);
    assert_eq!(service.listings.get(), 1);

    let err = resolve_data_passes(&service, &["LHC24af_apass1", "LHC99x"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "No data pass ID found for LHC99x. Check if your token is still valid; the token \
         validity is 1 week only."
    );
    assert_eq!(service.listings.get(), 2);
}

// ============================================================================
// SECTION: Posting Runs
// ============================================================================

#[test]
fn batch_run_appends_minutes_and_summarises_mixed_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let minutes = dir.path().join("minutes.txt");
    let mut service = FakeService::new(&[100, 101, 102]);
    service.failing_runs.insert(101);
    let job = PostJob {
        data_pass: "LHC23zzh_apass4",
        settings: settings(0, false),
        mode: PostingMode::Batch(vec![batch_row(100, 9), batch_row(101, 7), batch_row(102, 9)]),
        detector: resolve_detector(&config(), "TPC").unwrap(),
        minutes: Some(minutes.as_path()),
        no_diff: false,
    };
    let pauses = Cell::new(0);

    let lines = execute_post(&service, &service, CountingPauser(&pauses), &job).unwrap();

    assert_eq!(
        lines,
        vec![
            String::new(),
            "=== Flag processing summary (per run) ===".to_string(),
            "Run 100: processed=1, failed=0, total_attempted=1".to_string(),
            "Run 101: processed=0, failed=1, total_attempted=1".to_string(),
            "Run 102: processed=1, failed=0, total_attempted=1".to_string(),
            "TOTAL processed flags: 2".to_string(),
        ]
    );
    assert_eq!(*service.posted.borrow(), vec![100, 102]);
    assert_eq!(
        fs::read_to_string(&minutes).unwrap(),
        "LHC23zzh_apass4\nRuns: 100, 102.\nAll the runs are GOOD.\n\n"
    );
    assert_eq!(pauses.get(), 0);
}

#[test]
fn minutes_are_ignored_outside_batch_mode() {
    let dir = tempfile::tempdir().unwrap();
    let minutes = dir.path().join("minutes.txt");
    let service = FakeService::new(&[100, 101]);
    let job = PostJob {
        data_pass: "LHC23zzh_apass4",
        settings: settings(1, false),
        mode: global_mode(),
        detector: resolve_detector(&config(), "TPC").unwrap(),
        minutes: Some(minutes.as_path()),
        no_diff: false,
    };
    let pauses = Cell::new(0);

    let lines = execute_post(&service, &service, CountingPauser(&pauses), &job).unwrap();

    assert_eq!(lines.last().map(String::as_str), Some("TOTAL processed flags: 2"));
    assert_eq!(*service.posted.borrow(), vec![100, 101]);
    assert_eq!(pauses.get(), 2);
    assert!(!minutes.exists());
}

#[test]
fn dry_run_posts_nothing_and_never_pauses() {
    let service = FakeService::new(&[100, 101, 102]);
    let job = PostJob {
        data_pass: "LHC23zzh_apass4",
        settings: settings(1, true),
        mode: global_mode(),
        detector: resolve_detector(&config(), "ITS").unwrap(),
        minutes: None,
        no_diff: false,
    };
    let pauses = Cell::new(0);

    let lines = execute_post(&service, &service, CountingPauser(&pauses), &job).unwrap();

    assert_eq!(lines.last().map(String::as_str), Some("TOTAL processed flags: 3"));
    assert!(service.posted.borrow().is_empty());
    assert_eq!(pauses.get(), 0);
}

#[test]
fn unknown_data_pass_stops_posting() {
    let service = FakeService::new(&[100]);
    let job = PostJob {
        data_pass: "LHC99x",
        settings: settings(0, false),
        mode: global_mode(),
        detector: resolve_detector(&config(), "TPC").unwrap(),
        minutes: None,
        no_diff: false,
    };
    let err = execute_post(&service, &service, CountingPauser(&Cell::new(0)), &job).unwrap_err();
    assert!(err.to_string().starts_with("No data pass ID found for LHC99x."));
    assert!(service.posted.borrow().is_empty());
}
