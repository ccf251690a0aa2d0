//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::{AppError, Result},
    config::env::EnvManager,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = Config::default();

        // Environment values seed the config; .env never overrides real variables
        self.load_env_file()?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    fn load_env_file(&self) -> Result<()> {
        EnvManager::load_env_file(self.cli.debug)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(ref url) = self.cli.url {
            config.target_url = Some(url.trim().to_string());
        }

        if let Some(requests) = self.cli.requests {
            config.total_requests = Some(requests);
        }

        if let Some(concurrency) = self.cli.concurrency {
            config.concurrency = Some(concurrency);
        }

        if let Some(timeout) = self.cli.timeout {
            config.timeout_seconds = timeout;
        }

        if !self.cli.use_colors() {
            config.enable_color = false;
        }

        // CLI-only switches
        config.json_output = self.cli.json;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            eprint!("{}", self.cli.get_config_summary());
            eprintln!("Applied CLI overrides to configuration");
            eprintln!("{}", display_config_summary(config));
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Target URL: {}", config.target_url.as_deref().unwrap_or("<unset>")));
    summary.push(format!("Total Requests: {}", display_count(config.total_requests)));
    summary.push(format!("Concurrency: {}", display_count(config.concurrency)));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("JSON Output: {}", config.json_output));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

fn display_count(value: Option<u64>) -> String {
    value.map_or_else(|| "<unset>".to_string(), |v| v.to_string())
}
