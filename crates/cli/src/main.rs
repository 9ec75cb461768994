//! vecadmin - collection administration for vector database services

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vecadmin::{execute, Cli};
use vecadmin_client::create_collection_client;
use vecadmin_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.connection.timeout_ms = timeout_ms;
    }
    debug!(
        "Using {} provider at {}",
        config.connection.provider,
        config.connection.endpoint_url()
    );

    let client = create_collection_client(&config)
        .await
        .context("Failed to create collection client")?;

    let output = execute(&client, &cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Initialize logging system; logs go to stderr so stdout stays parseable
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vecadmin={level},vecadmin_client={level},vecadmin_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    Ok(())
}
