//! loom: resolves a project's configuration through its plugins.
//!
//! Parses the command line, sets up logging, and prints the resolved
//! config as JSON.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use loom_core::config::LoggingConfig;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.logging());

    if let Err(e) = cli.execute().await {
        tracing::error!(kind = %e.kind, "{}", e.message);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. Logs go to stderr; stdout carries the JSON.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
