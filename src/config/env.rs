//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using environment and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# HTTP Stress Tester Configuration\n\
             #\n\
             # Values specified here are used when the matching command-line\n\
             # argument is not given.\n",
        );

        for (name, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("\n# {}\n# {}={}\n", description, name, example));
        }

        content
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "TARGET_URL" => {
                let parsed = url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid TARGET_URL value '{}': {}", value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("TARGET_URL must use http or https: {}", value)));
                }
            }
            "TOTAL_REQUESTS" | "CONCURRENCY" => {
                let count: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if count == 0 {
                    return Err(AppError::config(format!("{} must be greater than 0", key)));
                }
                let max = if key == "TOTAL_REQUESTS" {
                    crate::defaults::MAX_TOTAL_REQUESTS
                } else {
                    crate::defaults::MAX_CONCURRENCY
                };
                if count > max {
                    return Err(AppError::config(format!("{} cannot exceed {}, got: {}", key, max, count)));
                }
            }
            "TIMEOUT_SECONDS" => {
                let timeout: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > crate::defaults::MAX_TIMEOUT_SECS {
                    return Err(AppError::config(format!(
                        "TIMEOUT_SECONDS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_TIMEOUT_SECS, timeout
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TARGET_URL", "URL to request", "http://localhost:8080/"),
            ("TOTAL_REQUESTS", "Total number of requests", "1000"),
            ("CONCURRENCY", "Number of concurrent workers", "50"),
            ("TIMEOUT_SECONDS", "Per-request timeout in seconds (1-300)", "10"),
            ("ENABLE_COLOR", "Enable colored output (true/false)", "true"),
        ]
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err()
            })
            .map(|e| format!("Warning: {}", e))
            .collect()
    }

    /// Check if a .env file exists at `path` and validate its contents
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read .env file: {}", e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value.trim()) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}
