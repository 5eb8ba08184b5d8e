// crates/rct-post/src/lib.rs
// ============================================================================
// Module: Flag Posting
// Description: Posting modes, throttled posting engine, and minutes output.
// Purpose: Write quality flags back to the run condition service.
// Dependencies: csv, rct-core, thiserror, tracing
// ============================================================================

//! ## Overview
//! This crate plans and executes flag posts for one data pass and detector.
//! Inputs come from interval files or batch CSV tables, [`PostingMode`]
//! turns them into ordered requests, and [`PostingEngine`] submits them
//! through any [`rct_core::FlagSink`] with throttling and dry-run support.
//! Batch invocations may append a [`compose_minutes`] block to a text file.

pub mod engine;
pub mod filter;
pub mod input;
pub mod ledger;
pub mod minutes;
pub mod plan;

use thiserror::Error;

pub use engine::EngineSettings;
pub use engine::Pauser;
pub use engine::PostingEngine;
pub use engine::PostingOutcome;
pub use engine::ThreadPauser;
pub use filter::RunFilter;
pub use input::BatchRow;
pub use input::InputError;
pub use input::IntervalEntry;
pub use input::parse_batch;
pub use input::parse_interval_lines;
pub use input::read_batch_file;
pub use input::read_interval_file;
pub use ledger::OutcomeLedger;
pub use ledger::RunOutcome;
pub use minutes::QualityCategory;
pub use minutes::append_minutes;
pub use minutes::compose_minutes;
pub use plan::GlobalPlan;
pub use plan::IntervalPlan;
pub use plan::PostingMode;
pub use plan::PostingTarget;

/// Posting failures that abort an invocation.
#[derive(Debug, Error)]
pub enum PostingError {
    /// An input file could not be read.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The minutes file could not be written.
    #[error("minutes write failed: {0}")]
    Minutes(String),
}
