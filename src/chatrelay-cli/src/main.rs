//! Chatrelay CLI - Main entry point.
//!
//! - `chatrelay stream` - stream a response as it is generated
//! - `chatrelay get` - fetch a complete response
//! - `chatrelay review` - rate a finished chat

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chatrelay_cli::cli::{Cli, LogLevel, dispatch_command};

/// Crates whose diagnostics follow the selected level. Everything else is
/// limited to errors.
const LOG_TARGETS: [&str; 3] = ["chatrelay_cli", "chatrelay_client", "chatrelay_common"];

/// Resolve the log filter: `--verbose`, then `--log-level`, then
/// `CHATRELAY_LOG_LEVEL`, then `RUST_LOG`, then the default level.
fn log_filter(cli: &Cli) -> EnvFilter {
    let level = if cli.verbose {
        Some(LogLevel::Debug)
    } else if cli.log_level.is_some() {
        cli.log_level
    } else {
        std::env::var("CHATRELAY_LOG_LEVEL")
            .ok()
            .and_then(|value| LogLevel::parse_env(&value))
    };

    if level.is_none()
        && let Ok(directives) = std::env::var("RUST_LOG")
        && !directives.trim().is_empty()
    {
        return EnvFilter::new(directives);
    }

    let level = level.unwrap_or_default().directive();
    let directives = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .fold("error".to_string(), |acc, d| format!("{acc},{d}"));
    EnvFilter::new(directives)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&cli))
        .with_writer(std::io::stderr)
        .init();

    dispatch_command(cli).await
}
