//! Error handling for the stress tester

use thiserror::Error;

/// Custom error types for the stress tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Test execution errors
    #[error("Test execution error: {0}")]
    TestExecution(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new test execution error
    pub fn test_execution<S: Into<String>>(message: S) -> Self {
        Self::TestExecution(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Network(_) => "NETWORK",
            Self::HttpRequest(_) => "HTTP",
            Self::Timeout(_) => "TIMEOUT",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::TestExecution(_) => "TEST",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error means the run never started
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Validation(_) | Self::Parse(_))
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::Network(_) | Self::HttpRequest(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::TestExecution(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Network(_) | Self::HttpRequest(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Io(_) | Self::TestExecution(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::test_execution(format!("Worker task failed: {}", error))
    }
}

// Anyhow integration
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<AppError>() {
            Ok(app_error) => return app_error,
            Err(error) => error,
        };

        if error.root_cause().downcast_ref::<std::io::Error>().is_some() {
            Self::io(format!("{:#}", error))
        } else {
            Self::internal(format!("{:#}", error))
        }
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid configuration");
        assert_eq!(config_error.category(), "CONFIG");
        assert!(config_error.is_configuration_error());
        assert_eq!(config_error.exit_code(), 1);

        let network_error = AppError::network("Connection failed");
        assert_eq!(network_error.category(), "NETWORK");
        assert!(!network_error.is_configuration_error());
        assert_eq!(network_error.exit_code(), 2);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::config("--requests must be greater than 0");
        let display = error.to_string();
        assert!(display.contains("Configuration error"));
        assert!(display.contains("--requests must be greater than 0"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::validation("validation"),
            AppError::network("network"),
            AppError::http_request("http"),
            AppError::timeout("timeout"),
            AppError::io("io"),
            AppError::parse("parse"),
            AppError::test_execution("test"),
            AppError::internal("internal"),
        ];

        let expected_categories = [
            "CONFIG", "VALIDATION", "NETWORK", "HTTP", "TIMEOUT",
            "IO", "PARSE", "TEST", "INTERNAL",
        ];

        for (error, expected) in errors.iter().zip(expected_categories.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("test").exit_code(), 1);
        assert_eq!(AppError::validation("test").exit_code(), 1);
        assert_eq!(AppError::network("test").exit_code(), 2);
        assert_eq!(AppError::timeout("test").exit_code(), 3);
        assert_eq!(AppError::io("test").exit_code(), 5);
        assert_eq!(AppError::test_execution("test").exit_code(), 6);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<u32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let bool_error = "not-a-bool".parse::<bool>().unwrap_err();
        let app_error: AppError = bool_error.into();
        assert!(app_error.to_string().contains("Boolean parse error"));
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let url_error = url::Url::parse("not-a-valid-url").unwrap_err();
        let app_error: AppError = url_error.into();
        assert_eq!(app_error.category(), "PARSE");
        assert!(app_error.to_string().contains("URL parse error"));
    }

    #[test]
    fn test_dotenv_error_conversion() {
        let dotenv_error = dotenv::Error::LineParse(".env".to_string(), 1);
        let app_error: AppError = dotenv_error.into();
        assert_eq!(app_error.category(), "CONFIG");
        assert!(app_error.to_string().contains("Environment file error"));
    }

    #[test]
    fn test_anyhow_integration() {
        let anyhow_error = anyhow::anyhow!("Test anyhow error");
        let app_error: AppError = anyhow_error.into();
        assert_eq!(app_error.category(), "INTERNAL");

        let app_error = AppError::config("Test config error");
        let anyhow_error = anyhow::anyhow!(app_error);
        assert!(anyhow_error.to_string().contains("Configuration error"));

        let round_trip: AppError = anyhow_error.into();
        assert_eq!(round_trip.category(), "CONFIG");

        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let app_error: AppError = anyhow::Error::new(io_error).context("Writing output").into();
        assert_eq!(app_error.category(), "IO");
        assert!(app_error.to_string().contains("Writing output: denied"));
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::config("Test error");
        let formatted_no_color = error.format_for_console(false);
        let formatted_color = error.format_for_console(true);

        assert_eq!(formatted_no_color, "[CONFIG] Configuration error: Test error");
        assert!(formatted_color.contains("CONFIG"));
        assert!(formatted_color.contains("Test error"));
    }

    #[tokio::test]
    async fn test_join_error_conversion() {
        let handle = tokio::spawn(async { panic!("worker exploded") });
        let join_error = handle.await.unwrap_err();
        let app_error: AppError = join_error.into();
        assert_eq!(app_error.category(), "TEST");
        assert_eq!(app_error.exit_code(), 6);
    }
}
