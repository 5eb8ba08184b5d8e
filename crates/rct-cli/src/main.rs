// crates/rct-cli/src/main.rs
// ============================================================================
// Module: RCT CLI Entry Point
// Description: Command dispatcher for run condition table reports and flag posting.
// Purpose: Provide the `rct report` and `rct post` workflows over the service client.
// Dependencies: clap, rct-client, rct-config, rct-core, rct-post, rct-report, tracing
// ============================================================================

//! ## Overview
//! `rct report` writes one CSV run condition table per configured data pass.
//! `rct post` writes quality flags for one data pass and detector in global,
//! batch, or interval mode. Argument combinations are validated before any
//! file or network access. Diagnostics go to stderr through `tracing`; the
//! per-pass "ok" lines and the posting summary go to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rct_client::RctClient;
use rct_config::DataPassSettings;
use rct_config::RctConfig;
use rct_config::validate_throttle_sleep;
use rct_core::DataPass;
use rct_core::Detector;
use rct_core::FlagSink;
use rct_core::FlagTypeId;
use rct_core::MetadataError;
use rct_core::MetadataSource;
use rct_core::RunFetchOptions;
use rct_core::RunRange;
use rct_post::EngineSettings;
use rct_post::GlobalPlan;
use rct_post::IntervalPlan;
use rct_post::Pauser;
use rct_post::PostingEngine;
use rct_post::PostingMode;
use rct_post::PostingTarget;
use rct_post::RunFilter;
use rct_post::ThreadPauser;
use rct_post::append_minutes;
use rct_post::compose_minutes;
use rct_post::read_batch_file;
use rct_post::read_interval_file;
use rct_report::ReportRequest;
use rct_report::build_report;
use rct_report::report_file_name;
use rct_report::write_report_file;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "rct", version, disable_help_subcommand = true)]
struct Cli {
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write per-run detector flag tables as CSV.
    Report(ReportArgs),
    /// Post quality flags for one data pass and detector.
    Post(PostArgs),
}

/// Arguments for `rct report`.
#[derive(Args, Debug)]
struct ReportArgs {
    /// Configuration file (`.json` or TOML).
    config: PathBuf,
    /// Render timestamps as `YYYY-MM-DD HH:MM:SS` (UTC).
    #[arg(long, alias = "convert_time")]
    convert_time: bool,
    /// Directory receiving the CSV files.
    #[arg(long, alias = "output_dir", value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,
    /// Report only this data pass.
    #[arg(long, alias = "data_pass", value_name = "NAME")]
    data_pass: Option<String>,
}

/// Arguments for `rct post`.
#[derive(Args, Debug)]
struct PostArgs {
    /// Configuration file (`.json` or TOML).
    config: PathBuf,
    /// Data pass to flag.
    #[arg(long, alias = "data_pass", value_name = "NAME")]
    data_pass: String,
    /// Detector to flag.
    #[arg(long, value_name = "NAME")]
    detector: String,
    /// Flag type to post (global and interval modes).
    #[arg(long, alias = "flagTypeId", value_name = "ID")]
    flag_type_id: Option<u32>,
    /// Comment posted with every flag (global and interval modes).
    #[arg(long)]
    comment: Option<String>,
    /// Lowest run number to flag.
    #[arg(long, alias = "min_run", value_name = "RUN")]
    min_run: Option<u64>,
    /// Highest run number to flag.
    #[arg(long, alias = "max_run", value_name = "RUN")]
    max_run: Option<u64>,
    /// Runs never flagged.
    #[arg(long, alias = "excluded_runs", value_name = "RUN", num_args = 0..)]
    excluded_runs: Vec<u64>,
    /// Batch CSV file selecting runs and flag types.
    #[arg(short = 'b', long, value_name = "FILE")]
    batch: Option<PathBuf>,
    /// Interval file of `<run> <tmin> <tmax> [# comment]` lines.
    #[arg(long, alias = "interval_file", value_name = "FILE")]
    interval_file: Option<PathBuf>,
    /// Append a minutes block to this file (batch mode only).
    #[arg(long, value_name = "FILE")]
    minutes: Option<PathBuf>,
    /// Mark non-good runs as unchanged from the previous pass in the minutes.
    #[arg(long, alias = "no_diff")]
    no_diff: bool,
    /// Pause after every N successful posts; `0` disables (default from config).
    #[arg(long, alias = "throttle_n", value_name = "N")]
    throttle_n: Option<u64>,
    /// Pause duration in seconds (default from config).
    #[arg(long, alias = "throttle_sleep", value_name = "SECS")]
    throttle_sleep: Option<f64>,
    /// Skip every write; filters, logging, and the summary still run.
    #[arg(long, alias = "dry_run")]
    dry_run: bool,
    /// In dry-run, log each flag that would be posted.
    #[arg(long, alias = "dry_run_verbose")]
    dry_run_verbose: bool,
}

/// Posting mode selected by the argument set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ModeSelection {
    /// One flag per accepted run.
    Global(FlagTypeId),
    /// One flag per approved batch row.
    Batch(PathBuf),
    /// One flag per interval entry.
    Interval(PathBuf, FlagTypeId),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying the message shown to the operator.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.command {
        Commands::Report(args) => command_report(&args),
        Commands::Post(args) => command_post(&args),
    }
}

/// Installs the stderr log subscriber.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Loads and validates the configuration file.
fn load_config(path: &Path) -> CliResult<RctConfig> {
    RctConfig::load(path)
        .map_err(|err| CliError::new(format!("failed to load {}: {err}", path.display())))
}

/// Builds the service client.
fn build_client(config: &RctConfig) -> CliResult<RctClient> {
    RctClient::from_config(config).map_err(|err| CliError::new(err.to_string()))
}

/// Resolves a data pass, turning an unknown name into the token hint.
fn resolve_data_pass(source: &dyn MetadataSource, name: &str) -> CliResult<DataPass> {
    match source.resolve_data_pass(name) {
        Ok(data_pass) => Ok(data_pass),
        Err(MetadataError::DataPassNotFound(_)) => Err(missing_data_pass(name)),
        Err(err) => Err(CliError::new(err.to_string())),
    }
}

/// Resolves every named data pass from a single listing, in `names` order.
fn resolve_data_passes(source: &dyn MetadataSource, names: &[&str]) -> CliResult<Vec<DataPass>> {
    let listing = source.list_data_passes().map_err(|err| CliError::new(err.to_string()))?;
    names
        .iter()
        .map(|name| {
            listing
                .iter()
                .find(|pass| pass.name == *name)
                .cloned()
                .ok_or_else(|| missing_data_pass(name))
        })
        .collect()
}

/// Fatal error for a data pass the token cannot see.
fn missing_data_pass(name: &str) -> CliError {
    CliError::new(format!(
        "No data pass ID found for {name}. Check if your token is still valid; the token \
         validity is 1 week only."
    ))
}

/// Looks up the configured detector.
fn resolve_detector(config: &RctConfig, name: &str) -> CliResult<Detector> {
    config
        .detector(name)
        .ok_or_else(|| CliError::new(format!("No detector ID found for {name}")))
}

// ============================================================================
// SECTION: Report Command
// ============================================================================

/// Executes `rct report`.
fn command_report(args: &ReportArgs) -> CliResult<ExitCode> {
    let config = load_config(&args.config)?;
    let targets = report_targets(&config, args.data_pass.as_deref())?;
    let detectors = config.detectors();
    let client = build_client(&config)?;
    fs::create_dir_all(&args.output_dir).map_err(|err| {
        CliError::new(format!("failed to create {}: {err}", args.output_dir.display()))
    })?;

    let names: Vec<&str> = targets.iter().map(|(name, _)| name.as_str()).collect();
    let data_passes = resolve_data_passes(&client, &names)?;

    for ((name, range), data_pass) in targets.iter().zip(&data_passes) {
        let range = *range;
        let request = ReportRequest {
            data_pass,
            detectors: &detectors,
            range,
            convert_time: args.convert_time,
        };
        let report = build_report(&client, &request)
            .map_err(|err| CliError::new(format!("report for {name} failed: {err}")))?;
        let path = args.output_dir.join(report_file_name(name, range));
        write_report_file(&path, &report).map_err(|err| CliError::new(err.to_string()))?;
        write_stdout_line(&format!("[ ok ] {:4} runs -> {}", report.rows.len(), path.display()))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Lists the data passes to report with their run ranges.
///
/// A named pass missing from the configuration is reported over all runs.
fn report_targets(config: &RctConfig, only: Option<&str>) -> CliResult<Vec<(String, RunRange)>> {
    if let Some(name) = only {
        let range = config.data_passes.get(name).map(DataPassSettings::range).unwrap_or_default();
        return Ok(vec![(name.to_string(), range)]);
    }
    if config.data_passes.is_empty() {
        return Err(CliError::new("no data passes configured".to_string()));
    }
    Ok(config
        .data_passes
        .iter()
        .map(|(name, settings)| (name.to_string(), settings.range()))
        .collect())
}

// ============================================================================
// SECTION: Post Command
// ============================================================================

/// Resolved inputs of one posting invocation.
struct PostJob<'a> {
    /// Data pass name as given on the command line.
    data_pass: &'a str,
    /// Throttle and dry-run settings.
    settings: EngineSettings,
    /// Posting plan.
    mode: PostingMode,
    /// Detector to flag.
    detector: Detector,
    /// Minutes file, honoured in batch mode only.
    minutes: Option<&'a Path>,
    /// Same-quality clause for the minutes.
    no_diff: bool,
}

/// Executes `rct post`.
fn command_post(args: &PostArgs) -> CliResult<ExitCode> {
    let selection = select_mode(args)?;
    let config = load_config(&args.config)?;
    let job = PostJob {
        data_pass: &args.data_pass,
        settings: engine_settings(args, &config)?,
        mode: build_mode(args, &selection)?,
        detector: resolve_detector(&config, &args.detector)?,
        minutes: args.minutes.as_deref(),
        no_diff: args.no_diff,
    };
    let client = build_client(&config)?;
    for line in execute_post(&client, &client, ThreadPauser, &job)? {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Plans and posts the flags of `job`, then appends batch minutes.
///
/// Returns the summary lines for stdout.
fn execute_post<P: Pauser>(
    source: &dyn MetadataSource,
    sink: &dyn FlagSink,
    pauser: P,
    job: &PostJob<'_>,
) -> CliResult<Vec<String>> {
    let data_pass = resolve_data_pass(source, job.data_pass)?;
    let runs = source
        .fetch_runs(data_pass.id, &RunFetchOptions::default())
        .map_err(|err| CliError::new(err.to_string()))?;

    let target = PostingTarget {
        data_pass: &data_pass,
        detector: &job.detector,
    };
    let requests = job.mode.plan(&target, &runs);
    info!(
        mode = job.mode.label(),
        data_pass = %data_pass.name,
        detector = %job.detector.name,
        planned = requests.len(),
        dry_run = job.settings.dry_run,
        "posting flags"
    );
    let mut engine = PostingEngine::new(sink, job.settings, pauser);
    engine.submit_all(requests);
    let outcome = engine.finish();

    if let (PostingMode::Batch(_), Some(path)) = (&job.mode, job.minutes) {
        let text = compose_minutes(&data_pass.name, &outcome.posted, job.no_diff);
        append_minutes(path, &text).map_err(|err| CliError::new(err.to_string()))?;
    }
    Ok(outcome.ledger.summary_lines())
}

/// Validates argument compatibility and selects the posting mode.
fn select_mode(args: &PostArgs) -> CliResult<ModeSelection> {
    let reject = |message: &str| Err(CliError::new(message.to_string()));
    if args.batch.is_some() && args.interval_file.is_some() {
        return reject("--interval-file cannot be used together with -b/--batch");
    }
    if let Some(batch) = &args.batch {
        let run_scoped = args.min_run.is_some()
            || args.max_run.is_some()
            || !args.excluded_runs.is_empty()
            || args.comment.is_some()
            || args.flag_type_id.is_some();
        if run_scoped {
            return reject(
                "--min-run, --max-run, --excluded-runs, --comment, and --flag-type-id cannot be \
                 used with -b/--batch",
            );
        }
        if args.no_diff && args.minutes.is_none() {
            return reject("--no-diff can be used only if --minutes is used");
        }
        return Ok(ModeSelection::Batch(batch.clone()));
    }
    if let Some(interval_file) = &args.interval_file {
        if args.minutes.is_some() {
            return reject("--minutes can be used only in batch mode, not with --interval-file");
        }
        if args.no_diff {
            return reject("--no-diff can be used only in batch mode, not with --interval-file");
        }
        let Some(flag_type_id) = args.flag_type_id else {
            return reject("--flag-type-id is required when using --interval-file");
        };
        return Ok(ModeSelection::Interval(interval_file.clone(), FlagTypeId::new(flag_type_id)));
    }
    if args.minutes.is_some() {
        return reject("--minutes can be used only in batch mode");
    }
    if args.no_diff {
        return reject("--no-diff can be used only in batch mode");
    }
    let Some(flag_type_id) = args.flag_type_id else {
        return reject("--flag-type-id is required in global mode");
    };
    Ok(ModeSelection::Global(FlagTypeId::new(flag_type_id)))
}

/// Resolves throttle and dry-run settings; flags override the configuration.
fn engine_settings(args: &PostArgs, config: &RctConfig) -> CliResult<EngineSettings> {
    let throttle_sleep_secs = args.throttle_sleep.unwrap_or(config.posting.throttle_sleep_secs);
    validate_throttle_sleep(throttle_sleep_secs)
        .map_err(|err| CliError::new(format!("--throttle-sleep: {err}")))?;
    Ok(EngineSettings {
        dry_run: args.dry_run,
        dry_run_verbose: args.dry_run_verbose,
        throttle_n: args.throttle_n.unwrap_or(config.posting.throttle_n),
        throttle_sleep_secs,
    })
}

/// Reads the mode inputs and builds the posting plan.
fn build_mode(args: &PostArgs, selection: &ModeSelection) -> CliResult<PostingMode> {
    let filter = || RunFilter::new(args.min_run, args.max_run, args.excluded_runs.iter().copied());
    let input_error = |err: rct_post::InputError| CliError::new(err.to_string());
    Ok(match selection {
        ModeSelection::Global(flag_type_id) => PostingMode::Global(GlobalPlan {
            flag_type_id: *flag_type_id,
            comment: args.comment.clone(),
            filter: filter(),
        }),
        ModeSelection::Batch(path) => {
            PostingMode::Batch(read_batch_file(path, &args.data_pass).map_err(input_error)?)
        }
        ModeSelection::Interval(path, flag_type_id) => PostingMode::Interval(IntervalPlan {
            flag_type_id: *flag_type_id,
            comment: args.comment.clone(),
            filter: filter(),
            entries: read_interval_file(path).map_err(input_error)?,
        }),
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
