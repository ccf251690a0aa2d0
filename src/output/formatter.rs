//! Core formatting traits and implementations
//!
//! This module defines the report formatting interface and provides
//! a plain text implementation.

use crate::{
    error::Result,
    models::SummaryReport,
};
use std::fmt::Write as _;

/// Main trait for report output formatting
pub trait ReportFormatter {
    /// Format the full run report
    fn format_report(&self, report: &SummaryReport) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Include run metadata, throughput and transport error breakdown
    pub verbose_mode: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
        }
    }
}

/// Width of the label column in the report
pub(crate) const LABEL_WIDTH: usize = 21;

/// Render milliseconds with two decimals
pub(crate) fn format_ms(ms: f64) -> String {
    format!("{:.2} ms", ms)
}

/// Render an optional extreme; absent values print as `n/a`
pub(crate) fn format_optional_ms(ms: Option<f64>) -> String {
    ms.map_or_else(|| "n/a".to_string(), format_ms)
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    fn line(output: &mut String, label: &str, value: impl std::fmt::Display) {
        let _ = writeln!(output, "{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH);
    }
}

impl ReportFormatter for PlainFormatter {
    fn format_report(&self, report: &SummaryReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("Stress Test Report\n");
        output.push_str("==================\n");

        if self.options.verbose_mode {
            Self::line(&mut output, "Run ID", &report.run_id);
            Self::line(&mut output, "Target URL", &report.target_url);
            Self::line(&mut output, "Concurrency", report.concurrency);
            Self::line(&mut output, "Started at", report.started_at.to_rfc3339());
        }

        Self::line(&mut output, "Total time", format_ms(report.elapsed_ms()));
        Self::line(&mut output, "Total requests", report.total_requests);
        Self::line(&mut output, "Successful requests", report.successful_requests);
        Self::line(&mut output, "Failed requests", report.failed_requests);
        Self::line(&mut output, "Min duration", format_optional_ms(report.min_ms()));
        Self::line(&mut output, "Max duration", format_optional_ms(report.max_ms()));
        Self::line(&mut output, "Avg duration", format_ms(report.avg_ms()));

        if self.options.verbose_mode {
            Self::line(&mut output, "Success rate", format!("{:.2}%", report.success_rate()));
            Self::line(&mut output, "Throughput", format!("{:.2} req/s", report.requests_per_second()));
        }

        output.push_str("Status codes:\n");
        if report.status_codes.is_empty() {
            output.push_str("  (none)\n");
        }
        for (code, count) in &report.status_codes {
            let _ = writeln!(
                output,
                "  [{}] {} responses ({:.2}%)",
                code, count, report.status_percentage(*code)
            );
        }

        if report.transport_errors > 0 {
            let _ = writeln!(output, "Transport errors: {}", report.transport_errors);
            if self.options.verbose_mode {
                for (kind, count) in &report.error_kinds {
                    let _ = writeln!(output, "  {}: {}", kind, count);
                }
            }
        }

        Ok(output)
    }
}
