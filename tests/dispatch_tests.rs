//! End-to-end dispatch scenarios
//!
//! These tests drive complete runs against mock HTTP servers and scripted
//! transports and check the request count each one actually received.

use async_trait::async_trait;
use http_stress_tester::{
    HttpTransport, ReqwestTransport, StressTest, SummaryReport, TestConfiguration, TransportError,
    TransportErrorKind,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Replays a fixed script of results, one per call, in call order
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<u16, TransportError>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<u16, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, _url: &str) -> Result<u16, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        tokio::time::sleep(Duration::from_millis(2)).await;
        next.unwrap_or_else(|| Err(TransportError::new(TransportErrorKind::Other, "script exhausted")))
    }
}

async fn run_against(server: &MockServer, route: &str, total: usize, concurrency: usize) -> SummaryReport {
    let config = TestConfiguration::new(format!("{}{}", server.uri(), route), total, concurrency)
        .with_timeout(Duration::from_secs(5));
    let test = assert_ok!(StressTest::new(config));
    assert_ok!(test.run().await)
}

fn assert_consistent(report: &SummaryReport) {
    assert_eq!(report.successful_requests + report.failed_requests, report.total_requests);
    assert_eq!(report.histogram_total(), report.total_requests - report.transport_errors);
    if let (Some(min), Some(max)) = (report.min_duration, report.max_duration) {
        assert!(min <= report.avg_duration && report.avg_duration <= max);
    }
}

#[tokio::test]
async fn test_all_requests_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(10)
        .mount(&server)
        .await;

    let report = run_against(&server, "/health", 10, 3).await;

    assert_eq!(report.total_requests, 10);
    assert_eq!(report.successful_requests, 10);
    assert_eq!(report.failed_requests, 0);
    assert_eq!(report.status_codes.len(), 1);
    assert_eq!(report.status_codes.get(&200), Some(&10));
    assert_eq!(report.status_percentage(200), 100.0);
    assert!(report.min_duration.is_some());
    assert_consistent(&report);
}

#[tokio::test]
async fn test_non_success_statuses_are_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(6)
        .mount(&server)
        .await;

    let report = run_against(&server, "/missing", 6, 2).await;

    assert_eq!(report.successful_requests, 0);
    assert_eq!(report.failed_requests, 6);
    assert_eq!(report.transport_errors, 0);
    assert_eq!(report.status_codes.get(&404), Some(&6));
    assert_eq!(report.min_duration, None);
    assert_eq!(report.avg_duration, Duration::ZERO);
    assert_consistent(&report);
}

#[tokio::test]
async fn test_more_workers_than_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfiguration::new(server.uri(), 1, 100);
    let transport = Arc::new(ReqwestTransport::for_run(&config).unwrap());
    let results = StressTest::with_transport(config, transport).execute().await.unwrap();

    assert_eq!(results.report.total_requests, 1);
    assert_eq!(results.report.successful_requests, 1);
    assert_eq!(results.workers.workers, 100);
    assert_eq!(results.workers.idle_workers, 99);
}

#[tokio::test]
async fn test_single_worker_runs_sequentially() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(7)
        .mount(&server)
        .await;

    let report = run_against(&server, "/", 7, 1).await;
    assert_eq!(report.successful_requests, 7);
    assert_consistent(&report);
}

#[tokio::test]
async fn test_unreachable_target() {
    // Nothing listens on port 1
    let config = TestConfiguration::new("http://127.0.0.1:1/", 5, 5).with_timeout(Duration::from_secs(2));
    let report = StressTest::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.total_requests, 5);
    assert_eq!(report.successful_requests, 0);
    assert_eq!(report.failed_requests, 5);
    assert_eq!(report.transport_errors, 5);
    assert!(report.status_codes.is_empty());
    assert_eq!(report.avg_duration, Duration::ZERO);
    assert_eq!(report.min_duration, None);
    assert_eq!(report.max_duration, None);
    assert_consistent(&report);
}

#[tokio::test]
async fn test_timeouts_are_recorded_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(3)
        .mount(&server)
        .await;

    let config = TestConfiguration::new(server.uri(), 3, 3).with_timeout(Duration::from_millis(200));
    let report = StressTest::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.failed_requests, 3);
    assert_eq!(report.error_kinds.get(&TransportErrorKind::Timeout), Some(&3));
    assert!(report.status_codes.is_empty());
}

#[tokio::test]
async fn test_mixed_outcomes() {
    let transport = ScriptedTransport::new(vec![
        Ok(200),
        Ok(200),
        Ok(404),
        Err(TransportError::connect("connection reset")),
    ]);
    let config = TestConfiguration::new("http://stress.test/", 4, 2);

    let report = StressTest::with_transport(config, transport.clone()).run().await.unwrap();

    assert_eq!(transport.calls(), 4);
    assert_eq!(report.total_requests, 4);
    assert_eq!(report.successful_requests, 2);
    assert_eq!(report.failed_requests, 2);
    assert_eq!(report.transport_errors, 1);
    assert_eq!(report.status_codes.len(), 2);
    assert_eq!(report.status_codes.get(&200), Some(&2));
    assert_eq!(report.status_codes.get(&404), Some(&1));
    assert_eq!(report.status_percentage(200), 50.0);
    assert_eq!(report.status_percentage(404), 25.0);
    assert_consistent(&report);
}

#[tokio::test]
async fn test_outcome_count_matches_requests_across_concurrency() {
    for (total, concurrency) in [(1, 1), (5, 1), (5, 5), (5, 20), (50, 7)] {
        let transport = ScriptedTransport::new(vec![Ok(200); total]);
        let config = TestConfiguration::new("http://stress.test/", total, concurrency);

        let results = StressTest::with_transport(config, transport.clone()).execute().await.unwrap();

        assert_eq!(transport.calls(), total);
        assert_eq!(results.report.total_requests, total);
        assert_eq!(results.workers.attempts, total);
        assert_eq!(results.workers.idle_workers, concurrency.saturating_sub(total));
        assert_consistent(&results.report);
    }
}
