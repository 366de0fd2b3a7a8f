mod cli;
mod commands;
mod config;
mod console;
mod logger;
mod update;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use anyhow::Result;
use clap::Parser;
use log::warn;

use cli::{Cli, Commands};
use commands::install_cmd::handle_internal_update;
use commands::update_cmd::handle_update;
use config::UpdaterConfig;

fn main() -> Result<()> {
    let loaded = UpdaterConfig::load();

    let max_log_file_size_mb = loaded
        .as_ref()
        .map(|config| config.max_log_file_size_mb)
        .unwrap_or(0);
    let log_dir = config::exe_dir().ok().map(|dir| dir.join("logs"));
    logger::init(log_dir.as_deref(), max_log_file_size_mb);

    let mut config = loaded.unwrap_or_else(|e| {
        warn!("Using default update settings: {:#}", e);
        UpdaterConfig::default()
    });
    config.apply_env_overrides(|key| std::env::var(key).ok());

    let cli = Cli::parse();

    if cli.internal_update {
        return handle_internal_update(&config);
    }

    if let Some(Commands::Update) = cli.command {
        handle_update(config)?;
    }

    Ok(())
}
