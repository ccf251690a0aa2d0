//! Configuration data model and validation

use crate::defaults::{MAX_CONCURRENCY, MAX_TOTAL_REQUESTS};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
///
/// `target_url`, `total_requests` and `concurrency` have no defaults; they must
/// come from the environment or the command line before validation passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target URL to load
    #[serde(default)]
    pub target_url: Option<String>,

    /// Total number of GET requests to issue
    #[serde(default)]
    pub total_requests: Option<u64>,

    /// Number of concurrent workers
    #[serde(default)]
    pub concurrency: Option<u64>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Emit the report as JSON
    #[serde(default)]
    pub json_output: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: None,
            total_requests: None,
            concurrency: None,
            timeout_seconds: default_timeout_secs(),
            enable_color: default_enable_color(),
            json_output: false,
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        let url = match self.target_url.as_deref() {
            None => return Err(AppError::config("Missing required parameter --url")),
            Some(url) if url.trim().is_empty() => {
                return Err(AppError::config("Target URL cannot be empty"));
            }
            Some(url) => url,
        };

        match url::Url::parse(url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!(
                        "Target URL must use http or https: {}", url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!("Invalid target URL '{}': {}", url, e)));
            }
        }

        match self.total_requests {
            None => return Err(AppError::config("Missing required parameter --requests")),
            Some(0) => return Err(AppError::config("--requests must be greater than 0")),
            Some(n) if n > MAX_TOTAL_REQUESTS => {
                return Err(AppError::config(format!(
                    "--requests cannot exceed {}, got: {}", MAX_TOTAL_REQUESTS, n
                )));
            }
            Some(_) => {}
        }

        match self.concurrency {
            None => return Err(AppError::config("Missing required parameter --concurrency")),
            Some(0) => return Err(AppError::config("--concurrency must be greater than 0")),
            Some(n) if n > MAX_CONCURRENCY => {
                return Err(AppError::config(format!(
                    "--concurrency cannot exceed {}, got: {}", MAX_CONCURRENCY, n
                )));
            }
            Some(_) => {}
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > crate::defaults::MAX_TIMEOUT_SECS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds", crate::defaults::MAX_TIMEOUT_SECS
            )));
        }

        Ok(())
    }

    /// Build the immutable run input, validating first
    pub fn test_configuration(&self) -> Result<TestConfiguration> {
        self.validate()?;

        // validate() has checked every required field is present
        match (&self.target_url, self.total_requests, self.concurrency) {
            (Some(url), Some(requests), Some(concurrency)) => Ok(TestConfiguration {
                target_url: url.clone(),
                total_requests: requests as usize,
                concurrency: concurrency as usize,
                per_request_timeout: self.timeout(),
            }),
            _ => Err(AppError::internal("Validated configuration is incomplete")),
        }
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(target_url) = std::env::var("TARGET_URL") {
            let target_url = target_url.trim().to_string();
            if !target_url.is_empty() {
                self.target_url = Some(target_url);
            }
        }

        if let Ok(requests) = std::env::var("TOTAL_REQUESTS") {
            self.total_requests = Some(requests.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TOTAL_REQUESTS value '{}': {}", requests, e)))?);
        }

        if let Ok(concurrency) = std::env::var("CONCURRENCY") {
            self.concurrency = Some(concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CONCURRENCY value '{}': {}", concurrency, e)))?);
        }

        if let Ok(timeout) = std::env::var("TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Immutable input to a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfiguration {
    /// URL every attempt is sent to
    pub target_url: String,
    /// Exact number of attempts
    pub total_requests: usize,
    /// Number of workers; may exceed `total_requests`
    pub concurrency: usize,
    /// Timeout applied to each GET
    pub per_request_timeout: Duration,
}

impl TestConfiguration {
    /// Create a run configuration with the default per-request timeout
    pub fn new<S: Into<String>>(target_url: S, total_requests: usize, concurrency: usize) -> Self {
        Self {
            target_url: target_url.into(),
            total_requests,
            concurrency,
            per_request_timeout: crate::defaults::DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_request_timeout = timeout;
        self
    }

    /// Workers that will find the queue empty on their first take
    pub fn idle_workers(&self) -> usize {
        self.concurrency.saturating_sub(self.total_requests)
    }
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
