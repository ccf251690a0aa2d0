//! HTTP Stress Tester - Main CLI Application
//!
//! Fires a fixed number of GET requests at a target URL through a bounded
//! worker pool and prints a latency and status code summary.

use clap::{error::ErrorKind, Parser};
use http_stress_tester::{
    app::{self, App},
    cli::Cli,
    defaults::USAGE,
    error::AppError,
};
use std::{error::Error, io, process};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Malformed arguments are configuration errors like any other
            eprint!("{}", e);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let use_color = cli.use_colors();

    if cli.env_example {
        if let Err(e) = app::write_env_example(&mut io::stdout().lock()) {
            eprintln!("{}", e.format_for_console(use_color));
            process::exit(e.exit_code());
        }
        return;
    }

    match App::new(cli).run().await {
        Ok(outcome) => {
            print!("{}", outcome.rendered);
        }
        Err(e) => {
            eprintln!("{}", e.format_for_console(use_color));

            if let Some(source) = e.source() {
                eprintln!("Caused by: {}", source);
            }

            print_error_suggestions(&e);

            process::exit(e.exit_code());
        }
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("{}", USAGE);
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - --url, --requests and --concurrency are required");
            eprintln!("  - They may also be set with TARGET_URL, TOTAL_REQUESTS and CONCURRENCY");
            eprintln!("  - URLs must start with http:// or https://");
            eprintln!("  - Check your .env file format");
        }
        AppError::Network(_) | AppError::HttpRequest(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check that the HTTP client can be created on this system");
            eprintln!("  - Verify TLS and proxy settings");
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Reduce --concurrency");
            eprintln!("  - Check system resources such as open file limits");
        }
        _ => {}
    }
}
