use anyhow::Result;
use log::{debug, info};

use crate::config::{self, UpdaterConfig};
use crate::console::StdConsole;
use crate::update::{DefaultSteps, Updater};

pub fn handle_update(config: UpdaterConfig) -> Result<()> {
    if config::update_check_skipped(|key| std::env::var(key).ok()) {
        info!("Update check skipped ({} is set)", config::UPDATE_SKIP_ENV_KEY);
        return Ok(());
    }

    let mut updater = Updater::new(config, DefaultSteps, StdConsole);
    let outcome = updater.run(env!("CARGO_PKG_VERSION"), cfg!(windows));
    debug!("Update check finished in state {:?}", outcome.state());
    Ok(())
}
