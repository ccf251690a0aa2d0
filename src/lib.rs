//! HTTP Stress Tester
//!
//! A concurrent load generator that issues a fixed number of HTTP GET requests
//! against a target URL through a bounded pool of workers and folds the
//! per-request outcomes into a summary report.

pub mod app;
pub mod cli;
pub mod config;
pub mod client;
pub mod error;
pub mod logging;
pub mod stats;
pub mod executor;
pub mod output;
pub mod models;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, TestConfiguration, RequestOutcome, TransportError, TransportErrorKind, SummaryReport};
pub use executor::{Dispatcher, StressTest, TokenQueue};
pub use stats::Aggregator;
pub use client::{HttpTransport, ReqwestTransport};
pub use output::{ReportFormatter, ColoredFormatter, PlainFormatter, JsonFormatter, OutputFormatterFactory};

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const MAX_TIMEOUT_SECS: u64 = 300;
    pub const MAX_TOTAL_REQUESTS: u64 = 100_000_000;
    pub const MAX_CONCURRENCY: u64 = 100_000;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const USER_AGENT: &str = concat!("http-stress-tester/", env!("CARGO_PKG_VERSION"));
    pub const USAGE: &str = "Usage: stress-test --url=<URL> --requests=<N> --concurrency=<N>";
}
