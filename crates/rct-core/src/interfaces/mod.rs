// crates/rct-core/src/interfaces/mod.rs
// ============================================================================
// Module: RCT Interfaces
// Description: Backend-agnostic interfaces for metadata reads and flag writes.
// Purpose: Define the contract surfaces used by the report and post pipelines.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces decouple the pipelines from the HTTP transport. Every call is
//! synchronous and single-shot: implementations must not retry, and
//! non-success responses surface as errors to the caller, which decides
//! whether to skip the record or abort.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::DataPass;
use crate::core::DataPassId;
use crate::core::DetectorId;
use crate::core::FlagPostRequest;
use crate::core::FlagQueryResult;
use crate::core::Run;
use crate::core::RunFetchOptions;

// ============================================================================
// SECTION: Metadata Source
// ============================================================================

/// Metadata read errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Request could not be sent or the response could not be read.
    #[error("metadata request failed: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("metadata request returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
    /// The response body was not the expected JSON shape.
    #[error("metadata response decode failed: {0}")]
    Decode(String),
    /// No data pass with the requested name (or the token is no longer valid).
    #[error("no data pass found for {0}")]
    DataPassNotFound(String),
}

/// Read access to the run/flag metadata service.
pub trait MetadataSource {
    /// Lists every data pass visible to the current token.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the listing cannot be fetched.
    fn list_data_passes(&self) -> Result<Vec<DataPass>, MetadataError>;

    /// Resolves a data pass name to its service identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::DataPassNotFound`] when no pass matches, or
    /// another [`MetadataError`] when the listing cannot be fetched.
    fn resolve_data_pass(&self, name: &str) -> Result<DataPass, MetadataError> {
        self.list_data_passes()?
            .into_iter()
            .find(|pass| pass.name == name)
            .ok_or_else(|| MetadataError::DataPassNotFound(name.to_string()))
    }

    /// Fetches every run of a data pass, decorated according to `options`.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the run listing cannot be fetched.
    fn fetch_runs(
        &self,
        data_pass: DataPassId,
        options: &RunFetchOptions,
    ) -> Result<Vec<Run>, MetadataError>;

    /// Fetches the flags of one run/detector pair.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError`] when the flag listing cannot be fetched.
    fn fetch_flags(
        &self,
        data_pass: DataPassId,
        run_number: u64,
        detector: DetectorId,
    ) -> Result<FlagQueryResult, MetadataError>;
}

// ============================================================================
// SECTION: Flag Sink
// ============================================================================

/// Flag write errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PostError {
    /// Request could not be sent.
    #[error("exception: {0}")]
    Transport(String),
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
    /// The request body could not be encoded.
    #[error("request encoding failed: {0}")]
    Encode(String),
}

/// Write primitive posting exactly one flag.
pub trait FlagSink {
    /// Posts one flag; success means a 2xx response.
    ///
    /// # Errors
    ///
    /// Returns [`PostError`] when the write is not acknowledged.
    fn post_flag(&self, request: &FlagPostRequest) -> Result<(), PostError>;
}
