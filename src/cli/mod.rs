//! Command-line interface module

use clap::Parser;

/// HTTP Stress Tester - Issue a fixed number of GET requests through a bounded worker pool
#[derive(Parser, Debug, Clone)]
#[command(name = "stress-test")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target URL to request
    #[arg(long)]
    pub url: Option<String>,

    /// Total number of requests to perform
    #[arg(short = 'n', long)]
    pub requests: Option<u64>,

    /// Number of concurrent workers
    #[arg(short, long)]
    pub concurrency: Option<u64>,

    /// Per-request timeout in seconds
    ///
    /// Defaults to TIMEOUT_SECONDS, then 10 seconds.
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Print an example .env file and exit
    #[arg(long)]
    pub env_example: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.url {
            if url.trim().is_empty() {
                return Err("--url cannot be empty".to_string());
            }
        }

        if self.requests == Some(0) {
            return Err("--requests must be greater than 0".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("--concurrency must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.no_color || self.json {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line:\n");
        if let Some(ref url) = self.url {
            summary.push_str(&format!("  URL: {}\n", url));
        }
        if let Some(requests) = self.requests {
            summary.push_str(&format!("  Requests: {}\n", requests));
        }
        if let Some(concurrency) = self.concurrency {
            summary.push_str(&format!("  Concurrency: {}\n", concurrency));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  JSON output: {}\n", self.json));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > crate::defaults::MAX_TIMEOUT_SECS {
                Err(format!("Duration cannot exceed {} seconds", crate::defaults::MAX_TIMEOUT_SECS))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
