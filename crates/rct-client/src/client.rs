// crates/rct-client/src/client.rs
// ============================================================================
// Module: RCT HTTP Client
// Description: Blocking HTTP access to the run/flag metadata service.
// Purpose: Implement metadata reads and single-flag writes with strict limits.
// Dependencies: rct-config, rct-core, reqwest, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`RctClient`] issues bounded, single-attempt requests against the run
//! service and the flag endpoint. Redirects are not followed, bodies are read
//! under a size cap, and the access token travels as a `token` query
//! parameter. Errors never embed request URLs so the token stays out of logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use rct_config::HttpConfig;
use rct_config::RctConfig;
use rct_config::ServiceToken;
use rct_core::DataPass;
use rct_core::DataPassId;
use rct_core::DetectorId;
use rct_core::FlagPostRequest;
use rct_core::FlagQueryResult;
use rct_core::FlagSink;
use rct_core::MetadataError;
use rct_core::MetadataSource;
use rct_core::PostError;
use rct_core::QualityFlag;
use rct_core::Run;
use rct_core::RunFetchOptions;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::wire::Envelope;
use crate::wire::WireDataPass;
use crate::wire::WireFlag;
use crate::wire::decode_run;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum characters of an error response body kept for diagnostics.
pub const ERROR_BODY_SNIPPET_CHARS: usize = 300;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Client construction errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A configured endpoint could not be parsed.
    #[error("invalid service url {label}: {detail}")]
    InvalidUrl {
        /// Configuration key of the endpoint.
        label: &'static str,
        /// Parser message.
        detail: String,
    },
    /// The HTTP client could not be built.
    #[error("http client build failed: {0}")]
    Build(String),
}

/// Failure while reading a response body.
enum BodyError {
    /// Body exceeded the configured size cap.
    TooLarge,
    /// Body could not be read completely.
    Read(String),
}

impl BodyError {
    /// Renders the failure for error messages.
    fn describe(&self) -> String {
        match self {
            Self::TooLarge => "response exceeds size limit".to_string(),
            Self::Read(detail) => format!("failed to read response: {detail}"),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking client for the run/flag metadata service.
///
/// # Invariants
/// - Redirects are never followed.
/// - Every request is a single attempt bounded by its timeout.
/// - Response bodies larger than `max_response_bytes` are rejected.
pub struct RctClient {
    /// Run service base URL (`.../dataPasses`, `.../runs` are appended).
    run_api_url: Url,
    /// Flag endpoint used for reads and writes.
    flag_api_url: Url,
    /// Access token appended to every request.
    token: ServiceToken,
    /// Underlying HTTP client carrying the default timeout.
    client: Client,
    /// Timeout for run listings.
    runs_timeout: Duration,
    /// Response body cap.
    max_response_bytes: usize,
}

impl RctClient {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when an endpoint is malformed or the HTTP
    /// client cannot be created.
    pub fn from_config(config: &RctConfig) -> Result<Self, ClientError> {
        let run_api_url = parse_endpoint("run_api_url", &config.run_api_url)?;
        let flag_api_url = parse_endpoint("flag_api_url", &config.flag_api_url)?;
        let client = build_http_client(&config.http)?;
        Ok(Self {
            run_api_url,
            flag_api_url,
            token: config.token.clone(),
            client,
            runs_timeout: config.http.runs_timeout(),
            max_response_bytes: config.http.max_response_bytes,
        })
    }

    /// Returns `<run_api_url>/<segment>` with the token attached.
    fn run_service_url(&self, segment: &str) -> Result<Url, MetadataError> {
        let base = self.run_api_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{segment}"))
            .map_err(|err| MetadataError::Transport(format!("invalid request url: {err}")))?;
        url.query_pairs_mut().append_pair("token", self.token.expose());
        Ok(url)
    }

    /// Returns the flag endpoint with the given query pairs and the token.
    fn flag_url(&self, pairs: &[(&str, String)]) -> Url {
        let mut url = self.flag_api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
            query.append_pair("token", self.token.expose());
        }
        url
    }

    /// Issues a GET request and decodes the listing envelope.
    fn get_listing<T: DeserializeOwned>(
        &self,
        url: Url,
        timeout: Option<Duration>,
    ) -> Result<Vec<T>, MetadataError> {
        debug!(path = url.path(), "metadata request");
        let mut request = self.client.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let mut response =
            request.send().map_err(|err| MetadataError::Transport(err.without_url().to_string()))?;
        let status = response.status();
        let body = read_response_limited(&mut response, self.max_response_bytes)
            .map_err(|err| MetadataError::Transport(err.describe()))?;
        if !status.is_success() {
            return Err(MetadataError::Status {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|err| MetadataError::Decode(err.to_string()))?;
        Ok(envelope.data)
    }
}

impl MetadataSource for RctClient {
    fn list_data_passes(&self) -> Result<Vec<DataPass>, MetadataError> {
        let url = self.run_service_url("dataPasses")?;
        let passes: Vec<WireDataPass> = self.get_listing(url, None)?;
        Ok(passes
            .into_iter()
            .filter_map(|pass| {
                DataPassId::from_raw(pass.id).map(|id| DataPass {
                    name: pass.name,
                    id,
                })
            })
            .collect())
    }

    fn fetch_runs(
        &self,
        data_pass: DataPassId,
        options: &RunFetchOptions,
    ) -> Result<Vec<Run>, MetadataError> {
        let mut url = self.run_service_url("runs")?;
        url.query_pairs_mut().append_pair("filter[dataPassIds][]", &data_pass.to_string());
        let objects: Vec<Map<String, Value>> = self.get_listing(url, Some(self.runs_timeout))?;
        let mut runs = Vec::with_capacity(objects.len());
        for object in objects {
            let mut run = decode_run(object).map_err(MetadataError::Decode)?;
            run.decorate(options);
            runs.push(run);
        }
        debug!(data_pass = %data_pass, runs = runs.len(), "fetched runs");
        Ok(runs)
    }

    fn fetch_flags(
        &self,
        data_pass: DataPassId,
        run_number: u64,
        detector: DetectorId,
    ) -> Result<FlagQueryResult, MetadataError> {
        let url = self.flag_url(&[
            ("dataPassId", data_pass.to_string()),
            ("runNumber", run_number.to_string()),
            ("dplDetectorId", detector.to_string()),
        ]);
        let flags: Vec<WireFlag> = self.get_listing(url, None)?;
        Ok(FlagQueryResult::from_service_flags(flags.into_iter().map(QualityFlag::from).collect()))
    }
}

impl FlagSink for RctClient {
    fn post_flag(&self, request: &FlagPostRequest) -> Result<(), PostError> {
        let body = serde_json::to_vec(request).map_err(|err| PostError::Encode(err.to_string()))?;
        let url = self.flag_url(&[]);
        let mut response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| PostError::Transport(err.without_url().to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = read_response_limited(&mut response, self.max_response_bytes)
            .map_or_else(|err| err.describe(), |bytes| body_snippet(&bytes));
        Err(PostError::Status {
            status: status.as_u16(),
            body: detail,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a configured endpoint URL.
fn parse_endpoint(label: &'static str, value: &str) -> Result<Url, ClientError> {
    Url::parse(value).map_err(|err| ClientError::InvalidUrl {
        label,
        detail: err.to_string(),
    })
}

/// Builds the shared HTTP client.
fn build_http_client(config: &HttpConfig) -> Result<Client, ClientError> {
    let mut builder = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .redirect(Policy::none());
    if config.insecure_skip_tls_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder.build().map_err(|err| ClientError::Build(err.to_string()))
}

/// Returns the first characters of a response body for diagnostics.
fn body_snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(ERROR_BODY_SNIPPET_CHARS).collect()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, BodyError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| BodyError::TooLarge)?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(BodyError::TooLarge);
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| BodyError::Read(err.to_string()))?;
    if buf.len() > max_bytes {
        return Err(BodyError::TooLarge);
    }
    Ok(buf)
}
