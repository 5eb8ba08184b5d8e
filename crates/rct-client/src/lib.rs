// crates/rct-client/src/lib.rs
// ============================================================================
// Module: RCT Client Library
// Description: HTTP implementation of the metadata and flag-write interfaces.
// Purpose: Connect the rct tools to the remote run/flag service.
// Dependencies: rct-config, rct-core, reqwest
// ============================================================================

//! ## Overview
//! `rct-client` provides [`RctClient`], the blocking HTTP backend behind
//! [`rct_core::MetadataSource`] and [`rct_core::FlagSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ClientError;
pub use client::ERROR_BODY_SNIPPET_CHARS;
pub use client::RctClient;
