//! Per-request outcomes and the aggregated run report

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as _;
use std::fmt;
use std::time::Duration;
use chrono::{DateTime, Utc};

/// HTTP status counted as a successful request
pub const SUCCESS_STATUS: u16 = 200;

/// Classification of a failed HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TransportErrorKind {
    /// The per-request timeout elapsed
    Timeout,
    /// Connection could not be established (refused, DNS failure, TLS)
    Connect,
    /// Request could not be built or sent (malformed URL, redirect loop)
    Request,
    /// Anything the client does not classify
    Other,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to complete an HTTP exchange, as opposed to a non-200 response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new<S: Into<String>>(kind: TransportErrorKind, message: S) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("Request timed out after {}ms", after.as_millis()),
        )
    }

    pub fn connect<S: Into<String>>(message: S) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<&reqwest::Error> for TransportError {
    fn from(error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_builder() || error.is_request() || error.is_redirect() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };

        // reqwest's top-level message hides the root cause (e.g. "connection refused")
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self { kind, message }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::from(&error)
    }
}

/// Result of exactly one HTTP attempt
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The exchange completed with a status code
    Response { status_code: u16, duration: Duration },
    /// The exchange failed before a status code was available
    Failed { error: TransportError, duration: Duration },
}

impl RequestOutcome {
    pub fn response(status_code: u16, duration: Duration) -> Self {
        Self::Response { status_code, duration }
    }

    pub fn failed(error: TransportError, duration: Duration) -> Self {
        Self::Failed { error, duration }
    }

    /// Status code, present only when no transport error occurred
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status_code, .. } => Some(*status_code),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Self::Response { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    /// Elapsed wall-clock time of the attempt
    pub fn duration(&self) -> Duration {
        match self {
            Self::Response { duration, .. } | Self::Failed { duration, .. } => *duration,
        }
    }

    /// Status 200 with no transport error
    pub fn is_successful(&self) -> bool {
        self.status_code() == Some(SUCCESS_STATUS)
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn duration_ms(&self) -> f64 {
        to_ms(self.duration())
    }
}

/// Accumulated output of one run, read-only once finalized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Correlation id shared with the run's log entries
    pub run_id: String,
    pub target_url: String,
    pub concurrency: usize,
    pub started_at: DateTime<Utc>,

    pub total_requests: usize,
    /// Status 200 without transport error
    pub successful_requests: usize,
    /// Transport errors plus non-200 responses
    pub failed_requests: usize,
    pub transport_errors: usize,

    /// Dispatch start to the last outcome consumed
    pub total_elapsed_time: Duration,

    /// Status code histogram; outcomes with a transport error are not counted
    pub status_codes: BTreeMap<u16, usize>,
    pub error_kinds: BTreeMap<TransportErrorKind, usize>,

    /// Fastest successful request, `None` when nothing succeeded
    pub min_duration: Option<Duration>,
    /// Slowest successful request, `None` when nothing succeeded
    pub max_duration: Option<Duration>,
    /// Mean of successful requests, zero when nothing succeeded
    pub avg_duration: Duration,
}

impl SummaryReport {
    /// Share of `total_requests` that returned `status_code`, in percent
    pub fn status_percentage(&self, status_code: u16) -> f64 {
        let count = self.status_codes.get(&status_code).copied().unwrap_or(0);
        percentage(count, self.total_requests)
    }

    /// Successful requests as a percentage of all requests
    pub fn success_rate(&self) -> f64 {
        percentage(self.successful_requests, self.total_requests)
    }

    /// Completed requests per wall-clock second
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.total_elapsed_time.as_secs_f64();
        if secs > 0.0 {
            self.total_requests as f64 / secs
        } else {
            0.0
        }
    }

    /// Sum of the status histogram
    pub fn histogram_total(&self) -> usize {
        self.status_codes.values().sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_requests > 0
    }

    pub fn min_ms(&self) -> Option<f64> {
        self.min_duration.map(to_ms)
    }

    pub fn max_ms(&self) -> Option<f64> {
        self.max_duration.map(to_ms)
    }

    pub fn avg_ms(&self) -> f64 {
        to_ms(self.avg_duration)
    }

    pub fn elapsed_ms(&self) -> f64 {
        to_ms(self.total_elapsed_time)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn to_ms(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}
