//! Marker Probe - HTTP Proxy Liveness Checker
//!
//! Probes a list of HTTP proxies by fetching a target URL through each one
//! and looking for a marker substring in the response body. Alive proxies
//! are deduplicated by `host:port` and written to flat text files.

pub mod error;
pub mod logging;
pub mod proxy;

pub use error::{ProbeError, SetupError};
pub use proxy::*;

use proxy::checker::{DEFAULT_MARKER, DEFAULT_TARGET_URL, DEFAULT_TIMEOUT_MS};
use proxy::runner::DEFAULT_CONCURRENCY;
use std::path::PathBuf;
use std::time::Duration;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL fetched through each proxy
    pub target_url: String,
    /// Substring that marks a response as coming through a live proxy
    pub marker: String,
    /// Per-probe deadline in milliseconds
    pub timeout_ms: u64,
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// Newline-delimited `host:port` input list
    pub proxy_file: PathBuf,
    /// Append-only list of alive proxies, written while probing
    pub alive_file: PathBuf,
    /// Deduplicated alive proxies, overwritten at the end of a run
    pub unique_file: PathBuf,
    /// Duplicate alive entries, written only when there are any
    pub duplicates_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
            proxy_file: PathBuf::from("proxies.txt"),
            alive_file: PathBuf::from("alive.txt"),
            unique_file: PathBuf::from("unique.txt"),
            duplicates_file: PathBuf::from("duplicates.txt"),
        }
    }
}

impl Config {
    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> std::result::Result<(), SetupError> {
        if self.concurrency == 0 {
            return Err(SetupError::InvalidConcurrency(self.concurrency));
        }
        self.checker_config().validate()
    }

    pub fn checker_config(&self) -> CheckerConfig {
        CheckerConfig::new()
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_target_url(self.target_url.clone())
            .with_marker(self.marker.clone())
    }
}
