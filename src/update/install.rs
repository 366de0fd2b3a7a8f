use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::UpdaterConfig;

pub const REPLACE_TIMEOUT: Duration = Duration::from_secs(30);
pub const REPLACE_INTERVAL: Duration = Duration::from_millis(500);

/// `<dir>/tmc.new` installs over `<dir>/tmc`. `None` when the file name does not
/// carry the download suffix.
pub fn install_target_for(downloaded: &Path, suffix: &str) -> Option<PathBuf> {
    let file_name = downloaded.file_name()?.to_str()?;
    let target_name = file_name.strip_suffix(suffix)?;
    if target_name.is_empty() || suffix.is_empty() {
        return None;
    }
    Some(downloaded.with_file_name(target_name))
}

pub fn replace_binary_with_retry(
    new_binary_path: &Path,
    target_binary_path: &Path,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let started = Instant::now();

    loop {
        match fs::rename(new_binary_path, target_binary_path) {
            Ok(()) => {
                info!(
                    "Replaced binary: {:?} -> {:?}",
                    new_binary_path, target_binary_path
                );
                return Ok(());
            }
            Err(err) => {
                if started.elapsed() >= timeout {
                    return Err(anyhow::anyhow!(
                        "Failed to replace {:?} within {}s: {}",
                        target_binary_path,
                        timeout.as_secs(),
                        err
                    ));
                }
                warn!(
                    "Replacing {:?} failed, retrying: {}",
                    target_binary_path, err
                );
                std::thread::sleep(interval);
            }
        }
    }
}

/// Moves `downloaded` over the binary it was fetched to replace and returns the
/// installed path.
pub fn install_downloaded(downloaded: &Path, config: &UpdaterConfig) -> Result<PathBuf> {
    let target = install_target_for(downloaded, &config.download_suffix).ok_or_else(|| {
        anyhow::anyhow!(
            "{:?} is not a downloaded update (expected a '{}' suffix)",
            downloaded,
            config.download_suffix
        )
    })?;

    replace_binary_with_retry(downloaded, &target, REPLACE_TIMEOUT, REPLACE_INTERVAL)?;
    Ok(target)
}

pub fn install_current_exe(config: &UpdaterConfig) -> Result<PathBuf> {
    let current = std::env::current_exe().context("Failed to get executable path")?;
    install_downloaded(&current, config)
}

#[cfg(test)]
#[path = "../tests/install_tests.rs"]
mod tests;
