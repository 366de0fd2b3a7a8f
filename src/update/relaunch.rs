use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::{UPDATE_SKIP_ENV_KEY, UPDATE_SKIP_ENV_VALUE};

#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;

/// Starts `path internal_flag` without waiting for it. The child gets its own
/// process group so it outlives the parent.
pub fn launch_detached(path: &Path, internal_flag: &str) -> Result<()> {
    let mut cmd = Command::new(path);
    cmd.arg(internal_flag)
        .env(UPDATE_SKIP_ENV_KEY, UPDATE_SKIP_ENV_VALUE)
        .stdin(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(DETACHED_PROCESS);
    }

    let child = cmd
        .spawn()
        .with_context(|| format!("Failed to start updated binary {:?}", path))?;

    info!(
        "Started updated binary {:?} (pid {}) with {}",
        path,
        child.id(),
        internal_flag
    );
    Ok(())
}

#[cfg(test)]
#[path = "../tests/relaunch_tests.rs"]
mod tests;
