//! Output formatting and display system
//!
//! This module renders a finished run report as plain text, colored text
//! or JSON.

mod formatter;
mod colored;
mod json;

pub use formatter::{
    ReportFormatter,
    PlainFormatter,
    FormattingOptions,
};
pub use colored::{
    ColoredFormatter,
    PerformanceLevel,
};
pub use json::JsonFormatter;

use crate::models::Config;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on output mode, color support and verbosity
    pub fn create_formatter(config: &Config) -> Box<dyn ReportFormatter> {
        if config.json_output {
            return Box::new(JsonFormatter::new());
        }

        let options = FormattingOptions {
            enable_color: config.enable_color,
            verbose_mode: config.verbose || config.debug,
        };

        if options.enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}
