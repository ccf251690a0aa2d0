//! Main application orchestration and execution

use crate::{
    cli::Cli,
    client::{HttpTransport, ReqwestTransport},
    config::{load_config, validate_config, EnvManager},
    error::{AppError, Result},
    executor::{ExecutionResults, StressTest},
    logging::Logger,
    models::Config,
    output::OutputFormatterFactory,
};
use anyhow::Context;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Completed application run: the configuration used, the results and their rendering
#[derive(Debug)]
pub struct AppOutcome {
    pub config: Config,
    pub results: ExecutionResults,
    pub rendered: String,
}

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli, transport: None }
    }

    /// Use a caller-supplied transport instead of a `reqwest` client
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Run the application
    ///
    /// Configuration problems are returned before any request is sent. Once
    /// dispatch starts, per-request failures only show up in the report.
    pub async fn run(self) -> Result<AppOutcome> {
        let config = load_config(self.cli.clone())?;
        let warnings = validate_config(&config)?;

        let logger = Arc::new(Logger::with_config("stress-test".to_string(), &config));

        if config.verbose || config.debug {
            for warning in &warnings {
                eprintln!("{}", warning.format(config.enable_color));
            }
            if let Some(env_warnings) = EnvManager::check_env_file(Path::new(".env"))? {
                for warning in env_warnings {
                    eprintln!("{}", warning);
                }
            }
            for warning in EnvManager::validate_current_env() {
                eprintln!("{}", warning);
            }
        }

        let run_config = config.test_configuration()?;
        crate::log_debug!(
            logger,
            "Configuration loaded: {} requests, {} workers, {}s timeout",
            run_config.total_requests,
            run_config.concurrency,
            config.timeout_seconds
        );

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::for_run(&run_config)?),
        };

        let results = match StressTest::with_transport(run_config, transport)
            .with_logger(Arc::clone(&logger))
            .execute()
            .await
        {
            Ok(results) => results,
            Err(e) => {
                logger.error("Stress run failed")
                    .error_info(&e)
                    .field("error", e.to_string())
                    .location(file!(), line!(), Some(module_path!()))
                    .log()
                    .await;
                return Err(e);
            }
        };

        let formatter = OutputFormatterFactory::create_formatter(&config);
        let rendered = formatter.format_report(&results.report)?;

        Ok(AppOutcome { config, results, rendered })
    }
}

/// Write the example `.env` content to `out`
pub fn write_env_example<W: Write>(out: &mut W) -> Result<()> {
    emit_env_example(out).map_err(AppError::from)
}

fn emit_env_example<W: Write>(out: &mut W) -> anyhow::Result<()> {
    out.write_all(EnvManager::create_example_env_content().as_bytes())
        .context("Failed to write example .env content")?;
    out.flush().context("Failed to flush example .env content")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;
    use crate::models::TransportError;
    use async_trait::async_trait;
    use clap::Parser;

    struct AlwaysOk;

    #[async_trait]
    impl HttpTransport for AlwaysOk {
        async fn get(&self, _url: &str) -> std::result::Result<u16, TransportError> {
            Ok(200)
        }
    }

    fn clear_env() {
        for var in ["TARGET_URL", "TOTAL_REQUESTS", "CONCURRENCY", "TIMEOUT_SECONDS", "ENABLE_COLOR"] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_app_runs_and_renders() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cli = Cli::parse_from(["stress-test", "--url", "http://stress.test/", "-n", "8", "-c", "3", "--no-color"]);

        let outcome = App::new(cli).with_transport(Arc::new(AlwaysOk)).run().await.unwrap();

        assert_eq!(outcome.results.report.successful_requests, 8);
        assert!(outcome.rendered.contains("[200] 8 responses (100.00%)"));
        assert!(!outcome.config.json_output);
    }

    #[tokio::test]
    async fn test_app_json_output() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cli = Cli::parse_from(["stress-test", "--url", "http://stress.test/", "-n", "2", "-c", "2", "--json"]);

        let outcome = App::new(cli).with_transport(Arc::new(AlwaysOk)).run().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&outcome.rendered).unwrap();
        assert_eq!(json["successful_requests"], 2);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_env_example() {
        let mut out = Vec::new();
        write_env_example(&mut out).unwrap();

        let content = String::from_utf8(out).unwrap();
        assert!(content.contains("# TARGET_URL="));
        assert!(content.contains("# TIMEOUT_SECONDS=10"));
    }

    #[test]
    fn test_write_env_example_reports_io_failure() {
        let error = write_env_example(&mut ClosedPipe).unwrap_err();
        assert_eq!(error.category(), "IO");
        assert_eq!(error.exit_code(), 5);
        assert!(error.to_string().contains("Failed to write example .env content"));
    }

    #[tokio::test]
    async fn test_app_rejects_missing_url_before_dispatch() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let cli = Cli::parse_from(["stress-test", "-n", "2", "-c", "2"]);

        let error = App::new(cli).with_transport(Arc::new(AlwaysOk)).run().await.unwrap_err();
        assert!(error.is_configuration_error());
        assert_eq!(error.exit_code(), 1);
    }
}
