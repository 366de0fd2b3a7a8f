use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const UPDATE_URL_ENV_KEY: &str = "TMC_UPDATE_URL";
pub const UPDATE_SKIP_ENV_KEY: &str = "TMC_SKIP_UPDATE_CHECK";
pub const UPDATE_SKIP_ENV_VALUE: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdaterConfig {
    #[serde(default = "default_release_url")]
    pub release_url: String,
    #[serde(default = "default_releases_page_url")]
    pub releases_page_url: String,
    #[serde(default = "default_launcher_asset_name")]
    pub launcher_asset_name: String,
    #[serde(default = "default_windows_asset_extension")]
    pub windows_asset_extension: String,
    #[serde(default = "default_download_suffix")]
    pub download_suffix: String,
    #[serde(default)]
    pub metadata_timeout_secs: u64,
    #[serde(default)]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_log_file_size_mb")]
    pub max_log_file_size_mb: u64,
}

fn default_release_url() -> String {
    "https://api.github.com/repos/tmc-cli/tmc-cli/releases/latest".to_string()
}

fn default_releases_page_url() -> String {
    "https://github.com/tmc-cli/tmc-cli/releases/latest".to_string()
}

fn default_launcher_asset_name() -> String {
    "tmc".to_string()
}

fn default_windows_asset_extension() -> String {
    ".jar".to_string()
}

fn default_download_suffix() -> String {
    ".new".to_string()
}

fn default_user_agent() -> String {
    "tmc-cli-updater".to_string()
}

fn default_max_log_file_size_mb() -> u64 {
    20
}

/// Zero means "leave the transport default in place".
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            release_url: default_release_url(),
            releases_page_url: default_releases_page_url(),
            launcher_asset_name: default_launcher_asset_name(),
            windows_asset_extension: default_windows_asset_extension(),
            download_suffix: default_download_suffix(),
            metadata_timeout_secs: 0,
            connect_timeout_secs: 0,
            user_agent: default_user_agent(),
            max_log_file_size_mb: default_max_log_file_size_mb(),
        }
    }
}

impl UpdaterConfig {
    pub fn metadata_timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.metadata_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        timeout_from_secs(self.connect_timeout_secs)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse settings.json")
    }

    /// Reads `path`, returning defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Self::from_json(&content)
    }

    /// Loads `settings.json` from the executable directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(UPDATE_URL_ENV_KEY).filter(|url| !url.trim().is_empty()) {
            self.release_url = url.trim().to_string();
        }
    }
}

/// True when the relaunched process was told to leave the update check alone.
pub fn update_check_skipped<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(UPDATE_SKIP_ENV_KEY).is_some_and(|value| value == UPDATE_SKIP_ENV_VALUE)
}

pub fn exe_dir() -> Result<PathBuf> {
    let mut exe_path = std::env::current_exe().context("Failed to get executable path")?;
    exe_path.pop();
    Ok(exe_path)
}

fn get_config_path() -> Result<PathBuf> {
    Ok(exe_dir()?.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
