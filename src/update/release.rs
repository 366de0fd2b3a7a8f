use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use std::time::Duration;

use crate::config::UpdaterConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    pub tag_name: String,
    pub assets: Vec<Asset>,
}

fn parse_asset(value: &Value) -> Option<Asset> {
    let Some(entry) = value.as_object() else {
        debug!("Skipping release asset entry that is not an object: {}", value);
        return None;
    };
    let name = entry.get("name").and_then(|v| v.as_str());
    let url = entry.get("browser_download_url").and_then(|v| v.as_str());
    match (name, url) {
        (Some(name), Some(url)) => Some(Asset {
            name: name.to_string(),
            browser_download_url: url.to_string(),
        }),
        _ => {
            debug!("Skipping incomplete release asset entry: {}", value);
            None
        }
    }
}

/// Parses the latest-release document. Returns `None` for anything that is not a
/// JSON object carrying a string `tag_name`; unusable asset entries are skipped.
pub fn parse_release(body: &str) -> Option<ReleaseMetadata> {
    let document = match serde_json::from_str::<Value>(body) {
        Ok(document) => document,
        Err(err) => {
            warn!("Unable to parse latest release metadata: {}", err);
            return None;
        }
    };
    let Some(object) = document.as_object() else {
        warn!("Latest release metadata is not a JSON object");
        return None;
    };
    let Some(tag_name) = object.get("tag_name").and_then(|v| v.as_str()) else {
        warn!("Latest release metadata has no string tag_name");
        return None;
    };

    let assets = match object.get("assets") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            entries.iter().filter_map(parse_asset).collect()
        }
        Some(other) => {
            warn!("Ignoring release assets that are not an array: {}", other);
            Vec::new()
        }
    };

    Some(ReleaseMetadata {
        tag_name: tag_name.to_string(),
        assets,
    })
}

/// `None` keeps reqwest's default whole-request deadline.
fn build_client(timeout: Option<Duration>, config: &UpdaterConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(connect_timeout);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Asset downloads have no whole-request deadline: only connecting is bounded, so a
/// slow link can still finish a large body.
pub(crate) fn build_download_client(config: &UpdaterConfig) -> Result<Client> {
    let mut builder = Client::builder().timeout(None::<Duration>);
    if let Some(connect_timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(connect_timeout);
    }
    builder.build().context("Failed to build download HTTP client")
}

fn fetch_release_body(config: &UpdaterConfig) -> Result<String> {
    let client = build_client(config.metadata_timeout(), config)?;

    let body = client
        .get(&config.release_url)
        .header(USER_AGENT, config.user_agent.as_str())
        .send()
        .context("Failed to request latest release")?
        .error_for_status()
        .context("Release endpoint returned error status")?
        .text()
        .context("Failed to read latest release response")?;

    Ok(body)
}

/// One GET against the configured endpoint. Transport and parse failures are logged
/// and reported as "no release".
pub fn fetch_latest_release(config: &UpdaterConfig) -> Option<ReleaseMetadata> {
    match fetch_release_body(config) {
        Ok(body) => parse_release(&body),
        Err(err) => {
            warn!(
                "Failed to fetch latest release from {}: {:#}",
                config.release_url, err
            );
            None
        }
    }
}

/// First packaged archive on Windows-like hosts, the launcher script elsewhere.
pub fn select_asset<'a>(
    release: &'a ReleaseMetadata,
    is_windows_like: bool,
    config: &UpdaterConfig,
) -> Option<&'a Asset> {
    release.assets.iter().find(|asset| {
        if is_windows_like {
            asset.name.ends_with(&config.windows_asset_extension)
        } else {
            asset.name == config.launcher_asset_name
        }
    })
}

#[cfg(test)]
#[path = "../tests/release_tests.rs"]
mod tests;
