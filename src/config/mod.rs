//! Configuration management module

pub mod parser;
pub mod validation;
pub mod env;

// Re-export main functionality
pub use parser::{ConfigParser, load_config, display_config_summary};
pub use validation::{ConfigValidator, ValidationLevel, ValidationWarning, validate_config};
pub use env::EnvManager;

// Re-export from models for convenience
pub use crate::models::Config;

/// Serializes tests that touch process environment or the working directory
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
