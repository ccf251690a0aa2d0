//! Colored formatter implementation with terminal color support

use crate::{
    error::Result,
    models::SummaryReport,
};
use super::formatter::{FormattingOptions, ReportFormatter, LABEL_WIDTH, format_ms};
use std::fmt::Write as _;
use colored::*;

/// Performance level classification for color coding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl PerformanceLevel {
    /// Determine performance level from response time in milliseconds
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    /// Get descriptive text
    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
struct ColorScheme {
    header: Color,
    success: Color,
    warning: Color,
    error: Color,
    muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or untouched when colors are off
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    /// Format duration with color coding by performance level
    fn format_duration_colored(&self, duration_ms: Option<f64>) -> ColoredString {
        match duration_ms {
            Some(ms) => {
                let level = PerformanceLevel::from_response_time(ms);
                self.colorize(&format_ms(ms), level.color())
            }
            None => self.colorize("n/a", self.color_scheme.muted),
        }
    }

    /// Format percentage with color coding based on value
    fn format_percentage_colored(&self, percentage: f64) -> ColoredString {
        let color = if percentage >= 95.0 {
            self.color_scheme.success
        } else if percentage >= 80.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        };
        self.colorize(&format!("{:.2}%", percentage), color)
    }

    fn status_color(&self, status_code: u16) -> Color {
        match status_code {
            200 => self.color_scheme.success,
            100..=399 => self.color_scheme.warning,
            _ => self.color_scheme.error,
        }
    }

    fn line(output: &mut String, label: &str, value: impl std::fmt::Display) {
        let _ = writeln!(output, "{:<width$}{}", format!("{}:", label), value, width = LABEL_WIDTH);
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_report(&self, report: &SummaryReport) -> Result<String> {
        let mut output = String::new();

        let _ = writeln!(output, "{}", self.emphasize("Stress Test Report", self.color_scheme.header));
        let _ = writeln!(output, "{}", self.colorize("==================", self.color_scheme.header));

        if self.options.verbose_mode {
            Self::line(&mut output, "Run ID", self.colorize(&report.run_id, self.color_scheme.muted));
            Self::line(&mut output, "Target URL", self.bold(&report.target_url));
            Self::line(&mut output, "Concurrency", report.concurrency);
            Self::line(&mut output, "Started at", report.started_at.to_rfc3339());
        }

        Self::line(&mut output, "Total time", format_ms(report.elapsed_ms()));
        Self::line(&mut output, "Total requests", self.bold(&report.total_requests.to_string()));

        let successful = report.successful_requests.to_string();
        Self::line(&mut output, "Successful requests", self.colorize(&successful, self.color_scheme.success));

        let failed = report.failed_requests.to_string();
        let failed_color = if report.has_failures() { self.color_scheme.error } else { self.color_scheme.muted };
        Self::line(&mut output, "Failed requests", self.colorize(&failed, failed_color));

        Self::line(&mut output, "Min duration", self.format_duration_colored(report.min_ms()));
        Self::line(&mut output, "Max duration", self.format_duration_colored(report.max_ms()));

        let avg = if report.successful_requests > 0 {
            self.format_duration_colored(Some(report.avg_ms()))
        } else {
            // The zero average carries no performance level
            self.colorize(&format_ms(report.avg_ms()), self.color_scheme.muted)
        };
        Self::line(&mut output, "Avg duration", avg);

        if self.options.verbose_mode {
            Self::line(&mut output, "Success rate", self.format_percentage_colored(report.success_rate()));
            Self::line(&mut output, "Throughput", format!("{:.2} req/s", report.requests_per_second()));
            if report.successful_requests > 0 {
                let level = PerformanceLevel::from_response_time(report.avg_ms());
                Self::line(&mut output, "Performance", level.description());
            }
        }

        let _ = writeln!(output, "{}", self.bold("Status codes:"));
        if report.status_codes.is_empty() {
            let _ = writeln!(output, "  {}", self.colorize("(none)", self.color_scheme.muted));
        }
        for (code, count) in &report.status_codes {
            let tag = self.colorize(&format!("[{}]", code), self.status_color(*code));
            let _ = writeln!(
                output,
                "  {} {} responses ({:.2}%)",
                tag, count, report.status_percentage(*code)
            );
        }

        if report.transport_errors > 0 {
            let heading = format!("Transport errors: {}", report.transport_errors);
            let _ = writeln!(output, "{}", self.colorize(&heading, self.color_scheme.error));
            if self.options.verbose_mode {
                for (kind, count) in &report.error_kinds {
                    let _ = writeln!(output, "  {}: {}", kind, count);
                }
            }
        }

        Ok(output)
    }
}
