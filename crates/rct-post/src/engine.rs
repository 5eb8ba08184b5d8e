// crates/rct-post/src/engine.rs
// ============================================================================
// Module: Posting Engine
// Description: Throttled, dry-run aware execution of flag posts.
// Purpose: Post planned flags one at a time and account for every outcome.
// Dependencies: rct-core, tracing
// ============================================================================

//! ## Overview
//! [`PostingEngine`] submits planned [`FlagPostRequest`]s through a
//! [`FlagSink`] strictly in order. Every attempt updates the
//! [`OutcomeLedger`]. After every `throttle_n` cumulative successes the
//! engine pauses; in dry-run mode the sink is never called, every attempt
//! succeeds, and pauses are only logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use rct_core::FlagPostRequest;
use rct_core::FlagSink;
use tracing::error;
use tracing::info;

use crate::ledger::OutcomeLedger;

// ============================================================================
// SECTION: Pausing
// ============================================================================

/// Blocking pause between post batches.
pub trait Pauser {
    /// Blocks for `duration`.
    fn pause(&mut self, duration: Duration);
}

/// Pauser backed by [`thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPauser;

impl Pauser for ThreadPauser {
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Engine execution settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Skip writes and report every attempt as successful.
    pub dry_run: bool,
    /// Log each would-be request in dry-run mode.
    pub dry_run_verbose: bool,
    /// Pause after every N successes; `0` disables throttling.
    pub throttle_n: u64,
    /// Pause duration in seconds.
    pub throttle_sleep_secs: f64,
}

impl EngineSettings {
    /// Returns the pause duration.
    ///
    /// Invalid durations (negative, non-finite) collapse to zero; configuration
    /// validation rejects them earlier.
    #[must_use]
    pub fn pause_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.throttle_sleep_secs).unwrap_or(Duration::ZERO)
    }

    /// Returns true when `total` successes should trigger a pause.
    #[must_use]
    pub const fn pause_due(&self, total: u64) -> bool {
        self.throttle_n > 0 && total > 0 && total.is_multiple_of(self.throttle_n)
    }
}

/// Formats seconds the way throttle log lines show them (`5.0`, `2.5`).
fn format_secs(secs: f64) -> String {
    if secs.fract().abs() < f64::EPSILON { format!("{secs:.1}") } else { format!("{secs}") }
}

/// Log line written when a throttle pause is due after `total` successes.
fn throttle_message(total: u64, settings: &EngineSettings) -> String {
    let secs = format_secs(settings.throttle_sleep_secs);
    if settings.dry_run {
        format!("Processed {total} flags total (dry-run). Would sleep {secs} s here.")
    } else {
        format!("Posted {total} flags total. Sleeping {secs} s...")
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Result of one posting invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingOutcome {
    /// Per-run counters.
    pub ledger: OutcomeLedger,
    /// Requests that succeeded, in completion order.
    pub posted: Vec<FlagPostRequest>,
}

/// Sequential flag posting engine.
///
/// # Invariants
/// - Requests are attempted once each, in submission order.
/// - The sink is never called in dry-run mode.
pub struct PostingEngine<'a, P: Pauser> {
    /// Write primitive.
    sink: &'a dyn FlagSink,
    /// Execution settings.
    settings: EngineSettings,
    /// Pause implementation.
    pauser: P,
    /// Accumulated outcomes.
    outcome: PostingOutcome,
}

impl<'a, P: Pauser> PostingEngine<'a, P> {
    /// Creates an engine with a fresh ledger.
    pub fn new(sink: &'a dyn FlagSink, settings: EngineSettings, pauser: P) -> Self {
        Self {
            sink,
            settings,
            pauser,
            outcome: PostingOutcome::default(),
        }
    }

    /// Attempts one post and returns whether it succeeded.
    pub fn submit(&mut self, request: FlagPostRequest) -> bool {
        if !self.attempt(&request) {
            self.outcome.ledger.record_failure(request.run_number);
            return false;
        }
        let total = self.outcome.ledger.record_success(request.run_number);
        self.outcome.posted.push(request);
        if self.settings.pause_due(total) {
            info!("{}", throttle_message(total, &self.settings));
            if !self.settings.dry_run {
                self.pauser.pause(self.settings.pause_duration());
            }
        }
        true
    }

    /// Attempts every request in order.
    pub fn submit_all(&mut self, requests: impl IntoIterator<Item = FlagPostRequest>) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Returns the ledger accumulated so far.
    #[must_use]
    pub const fn ledger(&self) -> &OutcomeLedger {
        &self.outcome.ledger
    }

    /// Consumes the engine and returns its outcome.
    #[must_use]
    pub fn finish(self) -> PostingOutcome {
        self.outcome
    }

    /// Performs the write, or simulates it in dry-run mode.
    fn attempt(&self, request: &FlagPostRequest) -> bool {
        if self.settings.dry_run {
            if self.settings.dry_run_verbose {
                info!("DRY-RUN would POST: {request}");
            }
            return true;
        }
        match self.sink.post_flag(request) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "POST failed for run {} (from={}, to={}), {err}",
                    request.run_number,
                    display_endpoint(request.from),
                    display_endpoint(request.to)
                );
                false
            }
        }
    }
}

/// Renders an optional window endpoint for diagnostics.
fn display_endpoint(value: Option<i64>) -> String {
    value.map_or_else(|| "None".to_string(), |value| value.to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
