//! Configuration validation utilities and rules

use crate::{
    models::Config,
    error::Result,
};
use colored::Colorize;

/// Requests above which a run is flagged as long
const LARGE_RUN_REQUESTS: u64 = 100_000;

/// Workers above which the local machine may run out of sockets
const HIGH_CONCURRENCY: u64 = 1_000;

/// Configuration validator with advisory checks beyond `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration and collect non-fatal warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        if let Some(ref url) = config.target_url {
            warnings.extend(Self::validate_target_url(url));
        }
        warnings.extend(Self::validate_load_settings(config));

        Ok(warnings)
    }

    /// Advisory checks on the target URL; `Config::validate` has parsed it already
    fn validate_target_url(url: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let Ok(parsed) = url::Url::parse(url) else {
            return warnings;
        };

        if parsed.query().is_some() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("URL '{}' includes query parameters, which may affect caching", url),
            ));
        }

        let local = match parsed.host() {
            Some(url::Host::Ipv4(ip)) => ip.is_private() || ip.is_loopback(),
            Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
            Some(url::Host::Domain(domain)) => domain == "localhost",
            None => false,
        };
        if local {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("URL '{}' targets private/local network", url),
            ));
        }

        warnings
    }

    /// Check request count, worker count and timeout against each other
    fn validate_load_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let requests = config.total_requests.unwrap_or(0);
        let concurrency = config.concurrency.unwrap_or(0);

        if concurrency > requests {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Concurrency {} exceeds total requests {}; {} workers will exit without sending a request",
                    concurrency, requests, concurrency - requests
                ),
            ));
        }

        if concurrency > HIGH_CONCURRENCY {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Concurrency {} may exhaust local file descriptors", concurrency),
            ));
        }

        if requests > LARGE_RUN_REQUESTS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Configuration will perform {} requests, which may take a long time", requests),
            ));
        }

        if config.timeout_seconds > 60 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Long timeout of {}s will slow down failure detection", config.timeout_seconds),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            let tag = match self.level {
                ValidationLevel::Info => tag.blue(),
                ValidationLevel::Warning => tag.yellow(),
            };
            format!("{} {}", tag, self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
