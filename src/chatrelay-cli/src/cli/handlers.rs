//! Command dispatch.

use anyhow::{Context, Result};
use chatrelay_client::{ChatClient, ClientConfig};
use tracing::debug;

use super::args::{Cli, Commands};
use crate::chat_cmd::{run_get, run_stream};
use crate::review_cmd::run_review;

/// Load configuration, build a client and run the selected command.
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let config = ClientConfig::load(cli.config.as_deref(), |key| std::env::var(key).ok())
        .context("Failed to load configuration")?;
    debug!(config = ?config, "Configuration resolved");
    let client = ChatClient::new(config).context("Failed to create client")?;

    match cli.command {
        Commands::Stream(args) => run_stream(&client, args).await,
        Commands::Get(args) => run_get(&client, args).await,
        Commands::Review(args) => run_review(&client, args).await,
    }
}
