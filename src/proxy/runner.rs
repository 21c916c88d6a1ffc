//! Batch runner driving the checker over a whole proxy list

use crate::error::SetupError;
use crate::proxy::checker::ProxyChecker;
use crate::proxy::fetch::{Fetcher, HttpFetcher};
use crate::proxy::models::{BatchReport, CheckOutcome, Counters, ProxyAddress};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tracing::info;

/// Default number of concurrent probes
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Runs one probe per proxy with bounded parallelism, then deduplicates
pub struct BatchRunner<F = HttpFetcher> {
    checker: ProxyChecker<F>,
    concurrency: usize,
}

impl<F: Fetcher> BatchRunner<F> {
    pub fn new(checker: ProxyChecker<F>, concurrency: usize) -> Result<Self, SetupError> {
        if concurrency == 0 {
            return Err(SetupError::InvalidConcurrency(concurrency));
        }
        Ok(Self {
            checker,
            concurrency,
        })
    }

    pub fn checker(&self) -> &ProxyChecker<F> {
        &self.checker
    }

    /// Probe every proxy, at most `concurrency` at a time, and aggregate.
    ///
    /// Probes complete in any order but outcomes are collected in input
    /// order, so aggregation is deterministic.
    pub async fn run(&self, proxies: &[ProxyAddress]) -> BatchReport {
        let counters = Counters::new();

        info!(
            "Checking {} proxies with concurrency {}, timeout {}ms against {}",
            proxies.len(),
            self.concurrency,
            self.checker.config().timeout.as_millis(),
            self.checker.config().target_url
        );

        let shared = &counters;
        let outcomes = stream::iter(proxies)
            .map(move |proxy| self.checker.check(proxy, shared))
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        aggregate(outcomes, &counters)
    }
}

/// Sequential reduction of ordered outcomes into a report.
///
/// The first alive outcome for a `host:port` key claims it; later alive
/// outcomes with the same key become duplicates.
pub fn aggregate(outcomes: Vec<CheckOutcome>, counters: &Counters) -> BatchReport {
    let mut seen = HashSet::new();
    let mut report = BatchReport {
        probe_alive: counters.alive(),
        probe_dead: counters.died(),
        ..BatchReport::default()
    };

    for outcome in &outcomes {
        report.total = counters.record_total();
        let host = outcome.proxy.host();

        if outcome.marker_found {
            let key = outcome.proxy.key();
            if seen.insert(key.clone()) {
                report.unique_alive += 1;
                report.unique.push(key);
                info!("[{}] [Alive] Element found.", host);
            } else {
                report.duplicates.push(outcome.proxy.raw().to_string());
                info!("[{}] is a duplicate. [Duplicate]", host);
            }
        } else {
            report.dead += 1;
            info!(
                "[{}] [Dead] status code: [{}]. Element not found.",
                host,
                outcome
                    .status_code
                    .map_or_else(|| "none".to_string(), |s| s.to_string())
            );
        }
    }

    report.outcomes = outcomes;
    report
}
