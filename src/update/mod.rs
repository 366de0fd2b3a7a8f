use anyhow::Result;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::config::{self, UpdaterConfig};
use crate::console::{self, Console};

pub mod download;
pub mod install;
pub mod relaunch;
pub mod release;
pub mod version;

use release::{Asset, ReleaseMetadata};
use version::Version;

/// Argument telling a freshly downloaded binary to install itself.
pub const INTERNAL_UPDATE_FLAG: &str = "--internal-update";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Checking,
    Deciding,
    Confirming,
    Downloading,
    Relaunching,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NoRelease,
    InvalidVersion,
    UpToDate,
    NoMatchingAsset,
    ManualDownload,
    Declined,
    InstallDirUnavailable,
    InvalidAssetName,
    DownloadFailed,
    RelaunchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The new binary was started; nothing waits for it.
    Done { path: PathBuf },
    Aborted { at: UpdateState, reason: AbortReason },
}

impl UpdateOutcome {
    fn aborted(at: UpdateState, reason: AbortReason) -> Self {
        Self::Aborted { at, reason }
    }

    pub fn state(&self) -> UpdateState {
        match self {
            Self::Done { .. } => UpdateState::Done,
            Self::Aborted { at, .. } => *at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDecision {
    pub newer_available: bool,
    pub chosen_asset: Option<Asset>,
}

/// Compares the installed version against the release tag and, when the release is
/// newer, picks the asset for this platform.
pub fn decide(
    current_version: &str,
    latest: &ReleaseMetadata,
    is_windows_like: bool,
    config: &UpdaterConfig,
) -> Result<UpdateDecision> {
    let installed = Version::parse(current_version)?;
    let candidate = Version::parse(&latest.tag_name)?;
    debug!(
        "Comparing release {:?}{} against installed {:?}{}",
        candidate.segments(),
        candidate.suffix(),
        installed.segments(),
        installed.suffix()
    );

    if !version::is_newer(&candidate, &installed) {
        return Ok(UpdateDecision {
            newer_available: false,
            chosen_asset: None,
        });
    }

    Ok(UpdateDecision {
        newer_available: true,
        chosen_asset: release::select_asset(latest, is_windows_like, config).cloned(),
    })
}

/// Overridable steps of the update flow. The defaults talk to the network, the
/// filesystem and the OS process table.
pub trait UpdateSteps {
    fn fetch_release(&self, config: &UpdaterConfig) -> Option<ReleaseMetadata> {
        release::fetch_latest_release(config)
    }

    fn fetch_binary(&self, url: &str, destination: &Path, config: &UpdaterConfig) -> Result<()> {
        download::download_binary(url, destination, config)
    }

    fn relaunch(&self, path: &Path, internal_flag: &str) -> Result<()> {
        relaunch::launch_detached(path, internal_flag)
    }

    fn install_dir(&self) -> Result<PathBuf> {
        config::exe_dir()
    }
}

#[derive(Debug, Default)]
pub struct DefaultSteps;

impl UpdateSteps for DefaultSteps {}

fn is_plain_file_name(name: &str) -> bool {
    !name.contains(['/', '\\']) && Path::new(name).file_name().is_some_and(|f| f == name)
}

pub struct Updater<S, C> {
    config: UpdaterConfig,
    steps: S,
    console: C,
}

impl<S: UpdateSteps, C: Console> Updater<S, C> {
    pub fn new(config: UpdaterConfig, steps: S, console: C) -> Self {
        Self {
            config,
            steps,
            console,
        }
    }

    #[cfg(test)]
    pub fn steps(&self) -> &S {
        &self.steps
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Runs one update check to a terminal state. Never fails: every problem ends
    /// in `UpdateOutcome::Aborted` after being logged or shown to the user.
    pub fn run(&mut self, current_version: &str, is_windows_like: bool) -> UpdateOutcome {
        let outcome = self.drive(current_version, is_windows_like);
        match &outcome {
            UpdateOutcome::Done { path } => info!("Update handed off to {:?}", path),
            UpdateOutcome::Aborted { at, reason } => {
                debug!("Update aborted at {:?}: {:?}", at, reason)
            }
        }
        outcome
    }

    fn drive(&mut self, current_version: &str, is_windows_like: bool) -> UpdateOutcome {
        debug!("Checking {} for a newer release", self.config.release_url);
        let Some(release) = self.steps.fetch_release(&self.config) else {
            return UpdateOutcome::aborted(UpdateState::Checking, AbortReason::NoRelease);
        };

        let decision = match decide(current_version, &release, is_windows_like, &self.config) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(
                    "Cannot compare installed version '{}' with release '{}': {:#}",
                    current_version, release.tag_name, err
                );
                return UpdateOutcome::aborted(UpdateState::Deciding, AbortReason::InvalidVersion);
            }
        };
        if !decision.newer_available {
            debug!(
                "Installed version {} is up to date (latest {})",
                current_version, release.tag_name
            );
            return UpdateOutcome::aborted(UpdateState::Deciding, AbortReason::UpToDate);
        }
        let Some(asset) = decision.chosen_asset else {
            warn!(
                "Release {} has no asset for this platform (assets={})",
                release.tag_name,
                release.assets.len()
            );
            return UpdateOutcome::aborted(UpdateState::Deciding, AbortReason::NoMatchingAsset);
        };

        self.console.println("A new version of tmc-cli is available!");
        if is_windows_like {
            self.console
                .println(&format!("Download: {}", self.config.releases_page_url));
            return UpdateOutcome::aborted(UpdateState::Confirming, AbortReason::ManualDownload);
        }

        let answer = self.console.read_line("Do you want to download it? (y/N): ");
        if !console::is_affirmative(answer.as_deref()) {
            return UpdateOutcome::aborted(UpdateState::Confirming, AbortReason::Declined);
        }

        let install_dir = match self.steps.install_dir() {
            Ok(dir) => dir,
            Err(err) => {
                warn!("Unable to resolve install directory: {:#}", err);
                self.console
                    .println("Unable to find current program location, aborting update.");
                return UpdateOutcome::aborted(
                    UpdateState::Downloading,
                    AbortReason::InstallDirUnavailable,
                );
            }
        };
        if !is_plain_file_name(&asset.name) {
            error!("Refusing to download asset with unsafe name '{}'", asset.name);
            self.console
                .println("The release asset has an invalid name, aborting update.");
            return UpdateOutcome::aborted(UpdateState::Downloading, AbortReason::InvalidAssetName);
        }
        let destination =
            install_dir.join(format!("{}{}", asset.name, self.config.download_suffix));

        self.console.println("Downloading...");
        if let Err(err) =
            self.steps
                .fetch_binary(&asset.browser_download_url, &destination, &self.config)
        {
            error!("Failed to download tmc-cli: {:#}", err);
            self.console.println("Failed to download tmc-cli.");
            return UpdateOutcome::aborted(UpdateState::Downloading, AbortReason::DownloadFailed);
        }

        if let Err(err) = self.steps.relaunch(&destination, INTERNAL_UPDATE_FLAG) {
            error!("Failed to run the new tmc-cli: {:#}", err);
            self.console.println(&format!(
                "Failed to run the tmc-cli at {}",
                destination.display()
            ));
            self.console.println(&format!(
                "Run it with {} argument or contact the help desk",
                INTERNAL_UPDATE_FLAG
            ));
            return UpdateOutcome::aborted(UpdateState::Relaunching, AbortReason::RelaunchFailed);
        }

        UpdateOutcome::Done { path: destination }
    }
}

#[cfg(test)]
#[path = "../tests/updater_tests.rs"]
mod tests;
