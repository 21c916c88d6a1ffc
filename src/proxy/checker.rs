//! Proxy checker module for probing a single proxy

use crate::error::{ProbeError, SetupError};
use crate::proxy::alive::AliveRecorder;
use crate::proxy::fetch::{Fetcher, HttpFetcher};
use crate::proxy::models::{CheckOutcome, Counters, ProxyAddress};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default timeout for a whole probe in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default URL fetched through each proxy
pub const DEFAULT_TARGET_URL: &str = "https://www.cloudflare.com/";

/// Default marker searched for in the response body
pub const DEFAULT_MARKER: &str = "Security";

/// Number of body characters shown in progress output
const PREVIEW_LEN: usize = 15;

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Deadline for connect, request and body together
    pub timeout: Duration,
    /// URL to fetch through each proxy
    pub target_url: String,
    /// Substring whose presence in the body marks a proxy alive
    pub marker: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            target_url: DEFAULT_TARGET_URL.to_string(),
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_target_url(mut self, url: String) -> Self {
        self.target_url = url;
        self
    }

    pub fn with_marker(mut self, marker: String) -> Self {
        self.marker = marker;
        self
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.timeout.is_zero() {
            return Err(SetupError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Proxy checker that classifies a proxy by the marker in its response
pub struct ProxyChecker<F = HttpFetcher> {
    config: CheckerConfig,
    fetcher: F,
    alive: Option<AliveRecorder>,
}

impl ProxyChecker<HttpFetcher> {
    /// Create a checker that probes over real HTTP
    pub fn new(config: CheckerConfig) -> Self {
        Self::with_fetcher(config, HttpFetcher::new())
    }
}

impl<F: Fetcher> ProxyChecker<F> {
    pub fn with_fetcher(config: CheckerConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            alive: None,
        }
    }

    /// Record every alive proxy to `recorder` as soon as it is found
    pub fn with_alive_recorder(mut self, recorder: AliveRecorder) -> Self {
        self.alive = Some(recorder);
        self
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Probe a single proxy.
    ///
    /// Never fails: every error is folded into a dead outcome. The fetch is
    /// raced against the configured timeout and dropped if it loses, which
    /// closes its connection. Updates `counters` and, when alive, appends
    /// the proxy to the alive recorder.
    pub async fn check(&self, proxy: &ProxyAddress, counters: &Counters) -> CheckOutcome {
        let start = Instant::now();

        let fetched = tokio::time::timeout(
            self.config.timeout,
            self.fetcher.fetch(proxy, &self.config.target_url),
        )
        .await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let outcome = match fetched {
            Ok(Ok(response)) => match String::from_utf8(response.body) {
                Ok(body) => CheckOutcome::received(
                    proxy.clone(),
                    response.status,
                    body,
                    &self.config.marker,
                    elapsed_ms,
                ),
                Err(e) => CheckOutcome::failed(
                    proxy.clone(),
                    ProbeError::Decode {
                        status: Some(response.status),
                        reason: e.to_string(),
                    },
                    elapsed_ms,
                ),
            },
            Ok(Err(e)) => CheckOutcome::failed(proxy.clone(), e, elapsed_ms),
            Err(_) => CheckOutcome::failed(
                proxy.clone(),
                ProbeError::Timeout {
                    after_ms: self.config.timeout.as_millis() as u64,
                },
                elapsed_ms,
            ),
        };

        self.report(&outcome, counters).await;
        outcome
    }

    async fn report(&self, outcome: &CheckOutcome, counters: &Counters) {
        let host = outcome.proxy.host();
        let status = outcome
            .status_code
            .map_or_else(|| "none".to_string(), |s| s.to_string());

        if outcome.marker_found {
            let (alive, died) = counters.record_alive();
            info!(
                "[{}] took {}ms to respond with status code: [{}]. [Alive] Element found: {} : {} alive, {} died.",
                host, outcome.elapsed_ms, status, self.config.marker, alive, died
            );

            if let Some(ref recorder) = self.alive {
                if let Err(e) = recorder.append(outcome.proxy.raw()).await {
                    warn!(
                        "failed to append {} to {}: {}",
                        outcome.proxy,
                        recorder.path().display(),
                        e
                    );
                }
            }
        } else {
            let (alive, died) = counters.record_dead();
            match outcome.error {
                Some(ref e) => info!(
                    "[{}] failed with status code: [{}], [Dead] {} : {} alive, {} died.",
                    host, status, e, alive, died
                ),
                None => info!(
                    "[{}] responded with status code: [{}]. Element not found : {} alive, {} died.",
                    host, status, alive, died
                ),
            }
        }

        debug!("body of {}: {}...", host, outcome.preview(PREVIEW_LEN));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::fetch::fake::{Script, ScriptedFetcher};

    fn checker(fetcher: ScriptedFetcher, timeout: Duration) -> ProxyChecker<ScriptedFetcher> {
        let config = CheckerConfig::new()
            .with_timeout(timeout)
            .with_target_url("http://probe.test/".to_string())
            .with_marker("Security".to_string());
        ProxyChecker::with_fetcher(config, fetcher)
    }

    #[test]
    fn test_checker_config_default() {
        let config = CheckerConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(config.target_url, DEFAULT_TARGET_URL);
        assert_eq!(config.marker, DEFAULT_MARKER);
    }

    #[test]
    fn test_checker_config_builder() {
        let config = CheckerConfig::new()
            .with_timeout(Duration::from_millis(300))
            .with_target_url("http://example.com".to_string())
            .with_marker("Example Domain".to_string());

        assert_eq!(config.timeout, Duration::from_millis(300));
        assert_eq!(config.target_url, "http://example.com");
        assert_eq!(config.marker, "Example Domain");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = CheckerConfig::new().with_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(SetupError::InvalidTimeout)));
    }

    #[tokio::test]
    async fn test_marker_found_is_alive() {
        let fetcher = ScriptedFetcher::new().with("1.2.3.4:8080", Script::ok(200, "Security check"));
        let checker = checker(fetcher, Duration::from_secs(1));
        let counters = Counters::new();

        let outcome = checker
            .check(&ProxyAddress::parse("1.2.3.4:8080"), &counters)
            .await;

        assert!(outcome.marker_found);
        assert_eq!(outcome.status_code, Some(200));
        assert_eq!(outcome.proxy.host(), "1.2.3.4");
        assert_eq!(outcome.proxy.port(), "8080");
        assert_eq!((counters.alive(), counters.died()), (1, 0));
    }

    #[tokio::test]
    async fn test_non_success_status_with_marker_is_alive() {
        let fetcher =
            ScriptedFetcher::new().with("5.6.7.8:3128", Script::ok(403, "Blocked by Security"));
        let checker = checker(fetcher, Duration::from_secs(1));
        let counters = Counters::new();

        let outcome = checker
            .check(&ProxyAddress::parse("5.6.7.8:3128"), &counters)
            .await;

        assert!(outcome.is_alive());
        assert_eq!(outcome.status_code, Some(403));
    }

    #[tokio::test]
    async fn test_success_status_without_marker_is_dead() {
        let fetcher = ScriptedFetcher::new().with("5.6.7.8:3128", Script::ok(200, "<html></html>"));
        let checker = checker(fetcher, Duration::from_secs(1));
        let counters = Counters::new();

        let outcome = checker
            .check(&ProxyAddress::parse("5.6.7.8:3128"), &counters)
            .await;

        assert!(!outcome.is_alive());
        assert!(outcome.error.is_none());
        assert_eq!(outcome.body, "<html></html>");
        assert_eq!((counters.alive(), counters.died()), (0, 1));
    }

    #[tokio::test]
    async fn test_connection_failure_is_dead_without_status() {
        let checker = checker(ScriptedFetcher::new(), Duration::from_secs(1));
        let counters = Counters::new();

        let outcome = checker
            .check(&ProxyAddress::parse("10.0.0.1:1"), &counters)
            .await;

        assert!(!outcome.is_alive());
        assert_eq!(outcome.status_code, None);
        assert!(matches!(outcome.error, Some(ProbeError::Network { .. })));
        assert!(outcome.body.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_entry_without_port_is_dead_without_probing() {
        let config = CheckerConfig::new().with_timeout(Duration::from_secs(1));
        let checker = ProxyChecker::new(config);
        let counters = Counters::new();

        let outcome = checker
            .check(&ProxyAddress::parse("localhost"), &counters)
            .await;

        assert!(!outcome.is_alive());
        assert_eq!(outcome.status_code, None);
        assert!(matches!(outcome.error, Some(ProbeError::Client(_))));
        assert_eq!((counters.alive(), counters.died()), (0, 1));
    }

    #[tokio::test]
    async fn test_invalid_utf8_body_is_dead_even_if_marker_bytes_present() {
        let mut body = b"Security".to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        let fetcher = ScriptedFetcher::new().with(
            "1.2.3.4:80",
            Script::Respond {
                status: 200,
                body,
                delay: Duration::ZERO,
            },
        );
        let checker = checker(fetcher, Duration::from_secs(1));
        let counters = Counters::new();

        let outcome = checker
            .check(&ProxyAddress::parse("1.2.3.4:80"), &counters)
            .await;

        assert!(!outcome.is_alive());
        assert_eq!(outcome.status_code, Some(200));
        assert!(matches!(outcome.error, Some(ProbeError::Decode { .. })));
        assert_eq!(counters.died(), 1);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_near_deadline() {
        let fetcher = ScriptedFetcher::new().with(
            "1.2.3.4:80",
            Script::delayed(200, "Security", Duration::from_secs(10)),
        );
        let checker = checker(fetcher, Duration::from_millis(100));
        let counters = Counters::new();

        let start = Instant::now();
        let outcome = checker
            .check(&ProxyAddress::parse("1.2.3.4:80"), &counters)
            .await;

        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(outcome.is_timeout());
        assert!(!outcome.is_alive());
        assert_eq!(outcome.error, Some(ProbeError::Timeout { after_ms: 100 }));
    }

    #[tokio::test]
    async fn test_repeated_checks_classify_identically() {
        let fetcher = ScriptedFetcher::new()
            .with("1.2.3.4:80", Script::ok(200, "Security"))
            .with("4.3.2.1:80", Script::ok(200, "nothing"));
        let checker = checker(fetcher, Duration::from_secs(1));
        let counters = Counters::new();

        for _ in 0..3 {
            let alive = checker
                .check(&ProxyAddress::parse("1.2.3.4:80"), &counters)
                .await;
            let dead = checker
                .check(&ProxyAddress::parse("4.3.2.1:80"), &counters)
                .await;
            assert!(alive.is_alive());
            assert!(!dead.is_alive());
        }
        assert_eq!((counters.alive(), counters.died()), (3, 3));
        assert_eq!(checker.fetcher().calls(), 6);
    }

    #[tokio::test]
    async fn test_alive_proxy_is_recorded_immediately() {
        let path = std::env::temp_dir().join(format!("alive-{}.txt", uuid::Uuid::new_v4()));
        let fetcher = ScriptedFetcher::new()
            .with("1.2.3.4:80", Script::ok(200, "Security"))
            .with("4.3.2.1:80", Script::ok(200, "nothing"));
        let checker = checker(fetcher, Duration::from_secs(1))
            .with_alive_recorder(AliveRecorder::open(&path).await.unwrap());
        let counters = Counters::new();

        checker
            .check(&ProxyAddress::parse("1.2.3.4:80"), &counters)
            .await;
        checker
            .check(&ProxyAddress::parse("4.3.2.1:80"), &counters)
            .await;
        checker
            .check(&ProxyAddress::parse("1.2.3.4:80"), &counters)
            .await;

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1.2.3.4:80\n1.2.3.4:80\n");
        std::fs::remove_file(&path).unwrap();
    }
}
