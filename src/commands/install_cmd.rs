use anyhow::Result;
use log::{error, info};

use crate::config::UpdaterConfig;
use crate::update::install;

pub fn handle_internal_update(config: &UpdaterConfig) -> Result<()> {
    match install::install_current_exe(config) {
        Ok(installed) => {
            info!("Installed update at {:?}", installed);
            println!(
                "tmc-cli was updated to version {} ({})",
                env!("CARGO_PKG_VERSION"),
                installed.display()
            );
            Ok(())
        }
        Err(e) => {
            error!("Failed to install update: {:#}", e);
            eprintln!("Failed to finish the tmc-cli update: {:#}", e);
            eprintln!(
                "Replace the tmc binary with the downloaded '*{}' file manually or contact the help desk",
                config.download_suffix
            );
            Err(e)
        }
    }
}
