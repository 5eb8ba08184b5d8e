// crates/rct-core/src/core/identifiers.rs
// ============================================================================
// Module: RCT Identifiers
// Description: Typed identifiers assigned by the metadata service or config.
// Purpose: Keep data pass, detector, and flag type ids from being mixed up.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Data pass and detector identifiers are non-zero numeric ids. Flag type
//! identifiers are small enumerated values chosen by the service (for example
//! `9` for good runs). All serialize as bare numbers on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of a reconstruction pass, assigned by the remote service.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPassId(NonZeroU64);

impl DataPassId {
    /// Creates a new data pass identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a data pass identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for DataPassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// DPL detector identifier understood by the flag service.
///
/// # Invariants
/// - Always >= 1 (non-zero, 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectorId(NonZeroU64);

impl DetectorId {
    /// Creates a new detector identifier from a non-zero value.
    #[must_use]
    pub const fn new(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Creates a detector identifier from a raw value (returns `None` if zero).
    #[must_use]
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// Returns the raw identifier value (always >= 1).
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Flag type identifier (quality classification) posted with a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagTypeId(u32);

impl FlagTypeId {
    /// Creates a flag type identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FlagTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Named Entities
// ============================================================================

/// A reconstruction pass resolved against the service.
///
/// # Invariants
/// - Looked up once per invocation; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPass {
    /// Unique data pass name (for example `LHC23zzh_apass4`).
    pub name: String,
    /// Service-assigned identifier.
    pub id: DataPassId,
}

/// A configured detector subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detector {
    /// Human-readable detector name as it appears in run detector lists.
    pub name: String,
    /// DPL identifier used by the flag service.
    pub id: DetectorId,
}

impl Detector {
    /// Creates a detector entry.
    #[must_use]
    pub fn new(name: impl Into<String>, id: DetectorId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}
