//! Outcome aggregation for a stress run
//!
//! The aggregator is a single-consumer fold: every outcome produced by the
//! dispatcher passes through [`Aggregator::record`] exactly once, in arrival
//! order, and the finished state becomes a [`SummaryReport`].

use crate::{
    error::{AppError, Result},
    models::{RequestOutcome, SummaryReport, TestConfiguration, TransportErrorKind},
    models::metrics::SUCCESS_STATUS,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Running state of the fold
#[derive(Debug, Clone)]
pub struct Aggregator {
    run_id: String,
    target_url: String,
    concurrency: usize,
    started_at: DateTime<Utc>,
    expected: usize,

    total: usize,
    successful: usize,
    failed: usize,
    transport_errors: usize,
    status_codes: BTreeMap<u16, usize>,
    error_kinds: BTreeMap<TransportErrorKind, usize>,

    success_duration_total: Duration,
    // Duration::MAX until the first successful outcome
    min_duration: Duration,
    max_duration: Duration,
}

impl Aggregator {
    /// Create an aggregator expecting `config.total_requests` outcomes
    pub fn new(config: &TestConfiguration) -> Self {
        Self::with_run_id(config, Uuid::new_v4().to_string())
    }

    /// Create an aggregator whose report carries a caller-supplied run id
    pub fn with_run_id(config: &TestConfiguration, run_id: String) -> Self {
        Self {
            run_id,
            target_url: config.target_url.clone(),
            concurrency: config.concurrency,
            started_at: Utc::now(),
            expected: config.total_requests,
            total: 0,
            successful: 0,
            failed: 0,
            transport_errors: 0,
            status_codes: BTreeMap::new(),
            error_kinds: BTreeMap::new(),
            success_duration_total: Duration::ZERO,
            min_duration: Duration::MAX,
            max_duration: Duration::ZERO,
        }
    }

    /// Fold one outcome into the running state
    pub fn record(&mut self, outcome: &RequestOutcome) {
        self.total += 1;

        match outcome {
            RequestOutcome::Failed { error, .. } => {
                self.failed += 1;
                self.transport_errors += 1;
                *self.error_kinds.entry(error.kind).or_insert(0) += 1;
            }
            RequestOutcome::Response { status_code, duration } => {
                *self.status_codes.entry(*status_code).or_insert(0) += 1;

                if *status_code == SUCCESS_STATUS {
                    self.successful += 1;
                    self.success_duration_total = self.success_duration_total.saturating_add(*duration);
                    self.min_duration = self.min_duration.min(*duration);
                    self.max_duration = self.max_duration.max(*duration);
                } else {
                    self.failed += 1;
                }
            }
        }
    }

    /// Number of outcomes folded so far
    pub fn consumed(&self) -> usize {
        self.total
    }

    /// Number of outcomes the run is expected to produce
    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.total >= self.expected
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Mean successful duration; zero when nothing succeeded
    fn average(&self) -> Duration {
        if self.successful == 0 {
            return Duration::ZERO;
        }
        // Integer nanoseconds keep min <= avg <= max exact
        let nanos = self.success_duration_total.as_nanos() / self.successful as u128;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Freeze the fold into a report
    pub fn finalize(self, total_elapsed_time: Duration) -> SummaryReport {
        let avg_duration = self.average();
        let (min_duration, max_duration) = if self.successful > 0 {
            (Some(self.min_duration), Some(self.max_duration))
        } else {
            (None, None)
        };

        SummaryReport {
            run_id: self.run_id,
            target_url: self.target_url,
            concurrency: self.concurrency,
            started_at: self.started_at,
            total_requests: self.total,
            successful_requests: self.successful,
            failed_requests: self.failed,
            transport_errors: self.transport_errors,
            total_elapsed_time,
            status_codes: self.status_codes,
            error_kinds: self.error_kinds,
            min_duration,
            max_duration,
            avg_duration,
        }
    }

    /// Fold a finished sequence of outcomes, for offline use
    pub fn fold<'a, I>(config: &TestConfiguration, outcomes: I, total_elapsed_time: Duration) -> SummaryReport
    where
        I: IntoIterator<Item = &'a RequestOutcome>,
    {
        let mut aggregator = Self::new(config);
        for outcome in outcomes {
            aggregator.record(outcome);
        }
        aggregator.finalize(total_elapsed_time)
    }

    /// Consume exactly the expected number of outcomes from `receiver`
    ///
    /// The loop is bounded by the a-priori count, not by channel closure.
    /// Closure before the count is reached means a worker died without
    /// reporting, which is an execution error.
    pub async fn collect(
        mut self,
        receiver: &mut mpsc::Receiver<RequestOutcome>,
        dispatch_started: Instant,
    ) -> Result<SummaryReport> {
        while !self.is_complete() {
            match receiver.recv().await {
                Some(outcome) => self.record(&outcome),
                None => {
                    return Err(AppError::test_execution(format!(
                        "Outcome stream closed after {} of {} requests",
                        self.total, self.expected
                    )));
                }
            }
        }

        Ok(self.finalize(dispatch_started.elapsed()))
    }
}
