//! Proxy data models

use crate::error::ProbeError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Proxy address as read from the input list, split into host and port.
///
/// The first two colon-separated fields are host and port; anything after
/// them (such as `user:pass`) is ignored. Nothing is validated: a malformed
/// entry keeps whatever parts it has and simply fails when probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    raw: String,
    host: String,
    port: String,
}

impl ProxyAddress {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let mut parts = raw.split(':');
        let host = parts.next().unwrap_or_default();
        let port = parts.next().unwrap_or_default();

        Self {
            raw: raw.to_string(),
            host: host.trim().to_string(),
            port: port.trim().to_string(),
        }
    }

    /// The entry exactly as it appeared in the input list
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Forward-proxy URL the probe is routed through
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Deduplication key in `host:port` form.
    ///
    /// Hosts compare case-insensitively and numeric ports are normalised, so
    /// `Example.com:080` and `example.com:80` share a key.
    pub fn key(&self) -> String {
        let port = self
            .port
            .parse::<u16>()
            .map(|p| p.to_string())
            .unwrap_or_else(|_| self.port.clone());
        format!("{}:{}", self.host.to_ascii_lowercase(), port)
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Result of probing a single proxy
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub proxy: ProxyAddress,
    pub status_code: Option<u16>,
    /// Response text, or a short diagnostic when no body was received
    pub body: String,
    pub marker_found: bool,
    pub elapsed_ms: u64,
    pub error: Option<ProbeError>,
}

impl CheckOutcome {
    /// Outcome for a response whose body decoded as text
    pub fn received(
        proxy: ProxyAddress,
        status_code: u16,
        body: String,
        marker: &str,
        elapsed_ms: u64,
    ) -> Self {
        let marker_found = body.contains(marker);
        Self {
            proxy,
            status_code: Some(status_code),
            body,
            marker_found,
            elapsed_ms,
            error: None,
        }
    }

    /// Outcome for a probe that produced no usable body
    pub fn failed(proxy: ProxyAddress, error: ProbeError, elapsed_ms: u64) -> Self {
        Self {
            proxy,
            status_code: error.status(),
            body: error.to_string(),
            marker_found: false,
            elapsed_ms,
            error: Some(error),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.marker_found
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(ProbeError::is_timeout)
    }

    /// First characters of the body, for progress output
    pub fn preview(&self, len: usize) -> String {
        self.body.chars().take(len).collect()
    }
}

/// Batch tallies.
///
/// `alive` and `died` are bumped by every in-flight probe; `total` is bumped
/// once per outcome by the aggregation pass.
#[derive(Debug, Default)]
pub struct Counters {
    alive: AtomicUsize,
    died: AtomicUsize,
    total: AtomicUsize,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one alive probe and return the `(alive, died)` totals after it
    pub fn record_alive(&self) -> (usize, usize) {
        let alive = self.alive.fetch_add(1, Ordering::SeqCst) + 1;
        (alive, self.died.load(Ordering::SeqCst))
    }

    /// Count one dead probe and return the `(alive, died)` totals after it
    pub fn record_dead(&self) -> (usize, usize) {
        let died = self.died.fetch_add(1, Ordering::SeqCst) + 1;
        (self.alive.load(Ordering::SeqCst), died)
    }

    /// Count one aggregated outcome and return the total after it
    pub fn record_total(&self) -> usize {
        self.total.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn alive(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }

    pub fn died(&self) -> usize {
        self.died.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// Final result of a batch run.
///
/// `probe_alive`/`probe_dead` are the raw counts taken while probing, so a
/// proxy listed twice is counted twice. `unique_alive`/`dead` come from the
/// deduplicating aggregation pass and always satisfy
/// `unique_alive + duplicates.len() + dead == total`.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Outcomes seen by the aggregation pass
    pub total: usize,
    pub unique_alive: usize,
    pub dead: usize,
    pub probe_alive: usize,
    pub probe_dead: usize,
    /// Unique `host:port` keys in first-seen order
    pub unique: Vec<String>,
    /// Original entries whose key was already recorded, in input order
    pub duplicates: Vec<String>,
    /// One outcome per input proxy, aligned with the input order
    pub outcomes: Vec<CheckOutcome>,
}

impl BatchReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}
