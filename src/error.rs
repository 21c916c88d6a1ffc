//! Error types for probing and run setup

use std::path::PathBuf;
use thiserror::Error;

/// Why a single probe did not yield a usable body.
///
/// These never escape [`ProxyChecker::check`](crate::proxy::ProxyChecker::check);
/// they are folded into the returned outcome as a dead classification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("timeout after {after_ms}ms")]
    Timeout { after_ms: u64 },
    #[error("network failure: {message}")]
    Network { status: Option<u16>, message: String },
    #[error("undecodable body: {reason}")]
    Decode { status: Option<u16>, reason: String },
    #[error("unusable proxy address: {0}")]
    Client(String),
}

impl ProbeError {
    /// HTTP status code carried by the failure, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Network { status, .. } | ProbeError::Decode { status, .. } => *status,
            ProbeError::Timeout { .. } | ProbeError::Client(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ProbeError::Timeout { .. })
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        ProbeError::Network {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Errors that abort a run before any proxy is probed
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("concurrency limit must be at least 1, got {0}")]
    InvalidConcurrency(usize),
    #[error("timeout must be greater than zero")]
    InvalidTimeout,
    #[error("failed to read proxy list {}: {source}", path.display())]
    ProxyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
