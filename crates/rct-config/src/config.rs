// crates/rct-config/src/config.rs
// ============================================================================
// Module: RCT Configuration
// Description: Configuration loading and validation for the rct tools.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: rct-core, serde, serde_json, toml, url
// ============================================================================

//! ## Overview
//! Configuration is read from a JSON file (`.json`) or a TOML file (any
//! other extension) with a strict size limit. It names the run and flag
//! service endpoints, the access token, the detectors in report column
//! order, the data passes to report on, HTTP limits, and posting throttle
//! defaults. Invalid configuration fails before any request is sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use rct_core::Detector;
use rct_core::DetectorId;
use rct_core::RunRange;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::ordered::OrderedMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Default timeout for single-record reads and writes.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default timeout for full run listings.
pub(crate) const DEFAULT_RUNS_TIMEOUT_MS: u64 = 60_000;
/// Minimum accepted request timeout.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum accepted request timeout.
pub(crate) const MAX_TIMEOUT_MS: u64 = 600_000;
/// Default response size cap in bytes.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;
/// Default number of successful posts between throttle pauses.
pub(crate) const DEFAULT_THROTTLE_N: u64 = 200;
/// Default throttle pause in seconds.
pub(crate) const DEFAULT_THROTTLE_SLEEP_SECS: f64 = 5.0;
/// Maximum accepted throttle pause in seconds.
pub(crate) const MAX_THROTTLE_SLEEP_SECS: f64 = 3_600.0;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Access token for the metadata service.
///
/// # Invariants
/// - Never printed by [`fmt::Debug`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ServiceToken(String);

impl ServiceToken {
    /// Creates a token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for request construction.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServiceToken(<redacted>)")
    }
}

/// Top-level rct configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RctConfig {
    /// Base URL of the run service (`.../dataPasses`, `.../runs`).
    pub run_api_url: String,
    /// Flag endpoint URL used for both reads and writes.
    pub flag_api_url: String,
    /// Service access token.
    pub token: ServiceToken,
    /// Detector name to DPL identifier, in report column order.
    pub detector_ids: OrderedMap<u64>,
    /// Data passes to report on, in processing order.
    #[serde(default, alias = "dataPassNames")]
    pub data_passes: OrderedMap<DataPassSettings>,
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Posting throttle defaults.
    #[serde(default)]
    pub posting: PostingConfig,
}

impl RctConfig {
    /// Loads and validates configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, parsing, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let is_json =
            path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json { Self::from_json_str(content) } else { Self::from_toml_str(content) }
    }

    /// Parses and validates JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_service_url("run_api_url", &self.run_api_url)?;
        validate_service_url("flag_api_url", &self.flag_api_url)?;
        if self.token.expose().trim().is_empty() {
            return Err(ConfigError::Invalid("token must be set".to_string()));
        }
        if self.detector_ids.is_empty() {
            return Err(ConfigError::Invalid("detector_ids must not be empty".to_string()));
        }
        for (name, id) in self.detector_ids.iter() {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("detector name must not be empty".to_string()));
            }
            if *id == 0 {
                return Err(ConfigError::Invalid(format!("detector {name} has id 0")));
            }
        }
        for (name, settings) in self.data_passes.iter() {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("data pass name must not be empty".to_string()));
            }
            settings.validate(name)?;
        }
        self.http.validate()?;
        self.posting.validate()?;
        Ok(())
    }

    /// Returns the configured detectors in column order.
    #[must_use]
    pub fn detectors(&self) -> Vec<Detector> {
        self.detector_ids
            .iter()
            .filter_map(|(name, id)| DetectorId::from_raw(*id).map(|id| Detector::new(name, id)))
            .collect()
    }

    /// Returns the named detector, if configured.
    #[must_use]
    pub fn detector(&self, name: &str) -> Option<Detector> {
        let id = self.detector_ids.get(name).copied().and_then(DetectorId::from_raw)?;
        Some(Detector::new(name, id))
    }
}

/// Per data pass report settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DataPassSettings {
    /// Inclusive `[lo, hi]` run range; either bound may be `null`.
    #[serde(default)]
    pub run_range: Option<(Option<u64>, Option<u64>)>,
    /// Lower bound for formats without `null` (used when `run_range` is absent).
    #[serde(default)]
    pub min_run: Option<u64>,
    /// Upper bound for formats without `null` (used when `run_range` is absent).
    #[serde(default)]
    pub max_run: Option<u64>,
}

impl DataPassSettings {
    /// Returns the effective run range.
    #[must_use]
    pub const fn range(&self) -> RunRange {
        match self.run_range {
            Some((lo, hi)) => RunRange::new(lo, hi),
            None => RunRange::new(self.min_run, self.max_run),
        }
    }

    /// Validates the range ordering.
    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let range = self.range();
        if let (Some(lo), Some(hi)) = (range.lo, range.hi)
            && lo > hi
        {
            return Err(ConfigError::Invalid(format!(
                "data pass {name}: run range lower bound {lo} exceeds upper bound {hi}"
            )));
        }
        Ok(())
    }
}

/// HTTP client configuration.
///
/// # Invariants
/// - Timeouts lie within `[MIN_TIMEOUT_MS, MAX_TIMEOUT_MS]`.
/// - `max_response_bytes` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Timeout for data pass listings, flag reads, and flag writes.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Timeout for run listings.
    #[serde(default = "default_runs_timeout_ms")]
    pub runs_timeout_ms: u64,
    /// Maximum accepted response body size.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Skip TLS certificate verification (service hosts with private CAs).
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            runs_timeout_ms: DEFAULT_RUNS_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: default_user_agent(),
            insecure_skip_tls_verify: false,
        }
    }
}

impl HttpConfig {
    /// Returns the single-record request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the run listing timeout.
    #[must_use]
    pub const fn runs_timeout(&self) -> Duration {
        Duration::from_millis(self.runs_timeout_ms)
    }

    /// Validates timeout and size limits.
    fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [("timeout_ms", self.timeout_ms), ("runs_timeout_ms", self.runs_timeout_ms)];
        for (label, value) in timeouts {
            if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "http.{label} must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
                )));
            }
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid("http.max_response_bytes must be > 0".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("http.user_agent must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Posting throttle defaults (command-line flags override them).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostingConfig {
    /// Pause after every N successful posts (`0` disables throttling).
    #[serde(default = "default_throttle_n")]
    pub throttle_n: u64,
    /// Pause duration in seconds.
    #[serde(default = "default_throttle_sleep_secs")]
    pub throttle_sleep_secs: f64,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            throttle_n: DEFAULT_THROTTLE_N,
            throttle_sleep_secs: DEFAULT_THROTTLE_SLEEP_SECS,
        }
    }
}

impl PostingConfig {
    /// Validates the throttle pause.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_throttle_sleep(self.throttle_sleep_secs)
    }
}

/// Checks that a throttle pause is finite, non-negative, and bounded.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for unusable durations.
pub fn validate_throttle_sleep(secs: f64) -> Result<(), ConfigError> {
    if !secs.is_finite() || !(0.0..=MAX_THROTTLE_SLEEP_SECS).contains(&secs) {
        return Err(ConfigError::Invalid(format!(
            "throttle sleep must be between 0 and {MAX_THROTTLE_SLEEP_SECS} seconds"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// JSON or TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates that a service URL is absolute http(s) without credentials.
fn validate_service_url(label: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{label} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{label} must use http or https")));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::Invalid(format!("{label} must not embed credentials")));
    }
    Ok(())
}

/// Default single-record timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default run listing timeout.
const fn default_runs_timeout_ms() -> u64 {
    DEFAULT_RUNS_TIMEOUT_MS
}

/// Default response size cap.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default user agent.
fn default_user_agent() -> String {
    format!("rct/{}", env!("CARGO_PKG_VERSION"))
}

/// Default throttle batch size.
const fn default_throttle_n() -> u64 {
    DEFAULT_THROTTLE_N
}

/// Default throttle pause.
const fn default_throttle_sleep_secs() -> f64 {
    DEFAULT_THROTTLE_SLEEP_SECS
}
