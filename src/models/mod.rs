//! Data models and structures for the stress tester

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::{Config, TestConfiguration};
pub use metrics::{RequestOutcome, TransportError, TransportErrorKind, SummaryReport};
