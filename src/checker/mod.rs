// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - http: probes a single URL with HEAD (falling back to GET) and classifies it
// - pool: runs many probes at once behind a fixed concurrency bound and puts
//         every result back in the slot of the record it belongs to
//
// This file (mod.rs) holds the types shared by both halves: the configuration,
// the result of a probe, and the errors that can stop a check before it starts.
// =============================================================================

mod http;
mod pool;

use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub use http::HttpProbe;
pub use pool::{check_records, is_probeable, CheckReport};

/// Default number of probes allowed in flight at once
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Browser-like User-Agent; bot filters often refuse unknown agents
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                      (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The outcome class of a liveness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    /// Answered with 2xx or 3xx
    Active,
    /// Refused, unresolvable, or answered with 4xx/5xx
    Down,
    /// Timed out, was never probed, or the run stopped before reaching it
    Unknown,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkState::Active => "Active",
            LinkState::Down => "Down",
            LinkState::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Result of probing one record's URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    pub state: LinkState,
    /// HTTP status code, when the server answered at all
    pub code: Option<u16>,
    /// Time from sending the first request to the final outcome
    pub elapsed: Option<Duration>,
}

impl StatusResult {
    pub fn new(state: LinkState, code: Option<u16>, elapsed: Option<Duration>) -> Self {
        Self { state, code, elapsed }
    }

    /// Status for a record that was never probed or never finished
    pub fn unknown() -> Self {
        Self::new(LinkState::Unknown, None, None)
    }
}

// "Active (200)", "Down (404)", "Down", "Unknown"
impl fmt::Display for StatusResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", self.state, code),
            None => write!(f, "{}", self.state),
        }
    }
}

/// Which HTTP method the first request of a probe uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProbeMethod {
    Head,
    Get,
}

/// Settings for a status-checking run
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Maximum number of probes in flight at once
    pub concurrency: usize,
    /// Timeout for each individual request
    pub timeout: Duration,
    pub method: ProbeMethod,
    /// Retry with GET when the server answers HEAD with a 4xx/5xx
    pub get_fallback: bool,
    /// Verify TLS certificates. Off by default: an expired certificate still
    /// means the site is up.
    pub verify_tls: bool,
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            method: ProbeMethod::Head,
            get_fallback: true,
            verify_tls: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CheckerConfig {
    /// Rejects settings the checker can't run with
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.concurrency == 0 {
            return Err(CheckError::InvalidConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(CheckError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Errors that stop a check before any URL is probed
///
/// Individual URLs never produce one of these; their failures are recorded as
/// a StatusResult instead.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("request timeout must be greater than zero")]
    InvalidTimeout,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
