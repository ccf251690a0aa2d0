//! JSON report output for scripting

use crate::{
    error::Result,
    models::{SummaryReport, TransportErrorKind},
};
use super::formatter::ReportFormatter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Machine-readable view of a report; durations in milliseconds
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    target_url: &'a str,
    concurrency: usize,
    started_at: DateTime<Utc>,
    total_requests: usize,
    successful_requests: usize,
    failed_requests: usize,
    transport_errors: usize,
    total_elapsed_ms: f64,
    min_duration_ms: Option<f64>,
    max_duration_ms: Option<f64>,
    avg_duration_ms: f64,
    success_rate: f64,
    requests_per_second: f64,
    status_codes: BTreeMap<u16, StatusEntry>,
    error_kinds: &'a BTreeMap<TransportErrorKind, usize>,
}

#[derive(Debug, Serialize)]
struct StatusEntry {
    count: usize,
    percentage: f64,
}

impl<'a> From<&'a SummaryReport> for JsonReport<'a> {
    fn from(report: &'a SummaryReport) -> Self {
        let status_codes = report
            .status_codes
            .iter()
            .map(|(code, count)| {
                (*code, StatusEntry { count: *count, percentage: report.status_percentage(*code) })
            })
            .collect();

        Self {
            run_id: &report.run_id,
            target_url: &report.target_url,
            concurrency: report.concurrency,
            started_at: report.started_at,
            total_requests: report.total_requests,
            successful_requests: report.successful_requests,
            failed_requests: report.failed_requests,
            transport_errors: report.transport_errors,
            total_elapsed_ms: report.elapsed_ms(),
            min_duration_ms: report.min_ms(),
            max_duration_ms: report.max_ms(),
            avg_duration_ms: report.avg_ms(),
            success_rate: report.success_rate(),
            requests_per_second: report.requests_per_second(),
            status_codes,
            error_kinds: &report.error_kinds,
        }
    }
}

/// Pretty-printed JSON formatter
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &SummaryReport) -> Result<String> {
        let mut output = serde_json::to_string_pretty(&JsonReport::from(report))?;
        output.push('\n');
        Ok(output)
    }
}
