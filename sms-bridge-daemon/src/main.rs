mod config;
mod diagnostics;
mod server;

use anyhow::{Context, Result};
use clap::Parser;
use diagnostics::{Cli, Command};
use sms_bridge_protocol::{SmsDispatcher, SqliteSmsStore};
use tokio::io::BufReader;
use tracing::info;

use config::Config;

/// Resolve the effective configuration from the config file and CLI overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_from(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    if let Some(database) = &cli.database {
        config.store.database_path = database.clone();
    }

    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    diagnostics::init_logging(&cli).context("Failed to initialize logging")?;

    let config = load_config(&cli)?;

    if cli.command == Some(Command::DumpConfig) {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("Starting SMS bridge daemon...");
    info!("SMS database: {}", config.store.database_path.display());
    info!("API level: {}", config.store.api_level);

    let store = SqliteSmsStore::open(&config.store.database_path, config.store.api_level)
        .context("Failed to open SMS store")?;
    let dispatcher = SmsDispatcher::new(store);

    let replies = server::serve(
        &dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config.channel.max_line_bytes,
    )
    .await
    .context("Host channel failed")?;

    info!("SMS bridge daemon stopped after {} replies", replies);
    Ok(())
}
