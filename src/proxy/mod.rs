//! Proxy module for probing proxies through a marker check
//!
//! This module provides functionality for:
//! - Loading `host:port` proxy lists
//! - Probing a single proxy with a deadline and classifying it by a body marker
//! - Running bounded-concurrency batches and deduplicating alive proxies
//! - Recording alive proxies and persisting unique/duplicate lists

pub mod alive;
pub mod checker;
pub mod fetch;
pub mod models;
pub mod parser;
pub mod runner;

pub use alive::AliveRecorder;
pub use checker::{CheckerConfig, ProxyChecker};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
pub use models::{BatchReport, CheckOutcome, Counters, ProxyAddress};
pub use parser::ProxyParser;
pub use runner::{aggregate, BatchRunner};
