//! Stress run execution engine
//!
//! This module contains:
//! - The token queue that fixes the number of attempts
//! - The dispatcher that drains it with a fixed pool of workers
//! - The stress test runner that wires dispatch to aggregation

pub mod queue;

pub use queue::TokenQueue;

use crate::{
    client::{HttpTransport, ReqwestTransport},
    defaults::{MAX_CONCURRENCY, MAX_TOTAL_REQUESTS},
    error::{AppError, Result},
    logging::{LogLevel, Logger},
    models::{RequestOutcome, SummaryReport, TestConfiguration},
    stats::Aggregator,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::{sync::mpsc, task::JoinHandle};

/// What the worker pool did during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Workers spawned
    pub workers: usize,
    /// Attempts performed across all workers
    pub attempts: usize,
    /// Workers that found the queue empty on their first take
    pub idle_workers: usize,
}

/// Report plus worker accounting for one run
#[derive(Debug, Clone)]
pub struct ExecutionResults {
    pub report: SummaryReport,
    pub workers: WorkerSummary,
}

/// Running worker pool returned by [`Dispatcher::dispatch`]
pub struct DispatchHandle {
    workers: Vec<JoinHandle<usize>>,
}

impl DispatchHandle {
    /// Wait for every worker to exit
    pub async fn join(self) -> Result<WorkerSummary> {
        let workers = self.workers.len();
        let mut attempts = 0;
        let mut idle_workers = 0;

        for joined in join_all(self.workers).await {
            let performed = joined?;
            attempts += performed;
            if performed == 0 {
                idle_workers += 1;
            }
        }

        Ok(WorkerSummary { workers, attempts, idle_workers })
    }
}

/// Drains a fixed token queue with `concurrency` workers
pub struct Dispatcher {
    config: TestConfiguration,
    transport: Arc<dyn HttpTransport>,
    logger: Arc<Logger>,
}

impl Dispatcher {
    pub fn new(config: TestConfiguration, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            logger: Arc::new(Logger::silent("DISPATCH".to_string())),
        }
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Fill the queue with `total_requests` tokens and start the workers
    ///
    /// Each worker emits exactly one outcome per token it claims. The
    /// `outcomes` channel must hold at least `total_requests` messages so
    /// that no worker ever waits on a full buffer.
    pub fn dispatch(&self, outcomes: mpsc::Sender<RequestOutcome>) -> DispatchHandle {
        let queue = Arc::new(TokenQueue::filled(self.config.total_requests));
        let url: Arc<str> = Arc::from(self.config.target_url.as_str());

        let workers = (0..self.config.concurrency)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&queue),
                    Arc::clone(&self.transport),
                    Arc::clone(&url),
                    outcomes.clone(),
                    Arc::clone(&self.logger),
                ))
            })
            .collect();

        // Workers hold the only remaining senders
        drop(outcomes);

        DispatchHandle { workers }
    }
}

/// Claim tokens until the queue is exhausted; returns the attempts performed
async fn run_worker(
    worker_id: usize,
    queue: Arc<TokenQueue>,
    transport: Arc<dyn HttpTransport>,
    url: Arc<str>,
    outcomes: mpsc::Sender<RequestOutcome>,
    logger: Arc<Logger>,
) -> usize {
    let mut attempts = 0;

    if logger.would_log(LogLevel::Debug) {
        logger.debug("Worker started")
            .field("worker", worker_id)
            .field("remaining", queue.remaining())
            .log()
            .await;
    }

    while queue.take() {
        let started = Instant::now();
        let result = transport.get(&url).await;
        let duration = started.elapsed();
        attempts += 1;

        let outcome = match result {
            Ok(status_code) => RequestOutcome::response(status_code, duration),
            Err(error) => RequestOutcome::failed(error, duration),
        };

        if logger.would_log(LogLevel::Debug) {
            logger.debug("Request completed")
                .field("worker", worker_id)
                .outcome(&outcome)
                .log()
                .await;
        }

        if outcomes.send(outcome).await.is_err() {
            // Aggregator is gone; nobody will read further outcomes
            break;
        }
    }

    if logger.would_log(LogLevel::Debug) {
        logger.debug("Worker exiting")
            .field("worker", worker_id)
            .field("attempts", attempts)
            .log()
            .await;
    }

    attempts
}

/// A complete stress run: dispatch plus aggregation
pub struct StressTest {
    config: TestConfiguration,
    transport: Arc<dyn HttpTransport>,
    logger: Arc<Logger>,
}

impl StressTest {
    /// Create a run backed by a `reqwest` client sized for the configuration
    pub fn new(config: TestConfiguration) -> Result<Self> {
        let transport = ReqwestTransport::for_run(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a run over a caller-supplied transport
    pub fn with_transport(config: TestConfiguration, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            logger: Arc::new(Logger::silent("RUN".to_string())),
        }
    }

    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = logger;
        self
    }

    fn check_config(&self) -> Result<()> {
        if self.config.target_url.trim().is_empty() {
            return Err(AppError::config("Target URL cannot be empty"));
        }
        if self.config.total_requests == 0 {
            return Err(AppError::config("Total requests must be greater than 0"));
        }
        if self.config.total_requests as u64 > MAX_TOTAL_REQUESTS {
            return Err(AppError::config(format!(
                "Total requests cannot exceed {}", MAX_TOTAL_REQUESTS
            )));
        }
        if self.config.concurrency == 0 {
            return Err(AppError::config("Concurrency must be greater than 0"));
        }
        if self.config.concurrency as u64 > MAX_CONCURRENCY {
            return Err(AppError::config(format!(
                "Concurrency cannot exceed {}", MAX_CONCURRENCY
            )));
        }
        Ok(())
    }

    /// Execute the run and return the finalized report
    pub async fn run(&self) -> Result<SummaryReport> {
        self.execute().await.map(|results| results.report)
    }

    /// Execute the run and return the report with worker accounting
    pub async fn execute(&self) -> Result<ExecutionResults> {
        self.check_config()?;

        let aggregator = Aggregator::new(&self.config);
        self.logger.set_run_id(aggregator.run_id().to_string()).await;
        self.logger.add_context_field("target_url".to_string(), &self.config.target_url).await;

        if self.logger.would_log(LogLevel::Info) {
            self.logger.info("Starting stress run")
                .field("total_requests", self.config.total_requests)
                .field("concurrency", self.config.concurrency)
                .field("timeout_ms", self.config.per_request_timeout.as_millis() as u64)
                .log()
                .await;
        }

        // One slot per request so no worker blocks on its send
        let (sender, mut receiver) = mpsc::channel(self.config.total_requests);

        let dispatcher = Dispatcher::new(self.config.clone(), Arc::clone(&self.transport))
            .with_logger(Arc::clone(&self.logger));

        let dispatch_started = Instant::now();
        let handle = dispatcher.dispatch(sender);

        let collected = aggregator.collect(&mut receiver, dispatch_started).await;
        drop(receiver);
        let joined = handle.join().await;

        // A worker panic explains a short outcome stream better than the count does
        let workers = joined?;
        let report = collected?;

        if self.logger.would_log(LogLevel::Info) {
            self.logger.info("Stress run finished")
                .field("successful", report.successful_requests)
                .field("failed", report.failed_requests)
                .field("elapsed_ms", report.elapsed_ms())
                .field("idle_workers", workers.idle_workers)
                .log()
                .await;
        }

        if report.successful_requests == 0 && self.logger.would_log(LogLevel::Warn) {
            self.logger.warn("No request succeeded")
                .field("transport_errors", report.transport_errors)
                .log()
                .await;
        }

        Ok(ExecutionResults { report, workers })
    }
}
