use anyhow::{Context, Result};
use log::info;
use reqwest::header::USER_AGENT;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::release::build_download_client;
use crate::config::UpdaterConfig;

/// Hashes everything passing through to the inner writer.
struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes: u64,
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Copies `reader` into a temporary file next to `destination` and renames it into
/// place only once every byte has been written and synced. On error the temporary
/// file is removed and `destination` is left untouched.
///
/// Returns the number of bytes written and their hex SHA-256.
pub fn write_atomically<R: Read>(reader: &mut R, destination: &Path) -> Result<(u64, String)> {
    let dir = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    let mut writer = DigestWriter {
        inner: temp,
        hasher: Sha256::new(),
        bytes: 0,
    };

    io::copy(reader, &mut writer)
        .with_context(|| format!("Failed to write download for {:?}", destination))?;
    writer.flush().context("Failed to flush downloaded file")?;

    let DigestWriter {
        inner: temp,
        hasher,
        bytes,
    } = writer;
    temp.as_file()
        .sync_all()
        .context("Failed to sync downloaded file")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to set permissions for {:?}", temp.path()))?;
    }

    temp.persist(destination)
        .map_err(|err| err.error)
        .with_context(|| format!("Failed to move download into place at {:?}", destination))?;

    Ok((bytes, format!("{:x}", hasher.finalize())))
}

pub fn download_binary(url: &str, destination: &Path, config: &UpdaterConfig) -> Result<()> {
    let client = build_download_client(config)?;

    let mut response = client
        .get(url)
        .header(USER_AGENT, config.user_agent.as_str())
        .send()
        .with_context(|| format!("Failed to download release asset from {}", url))?
        .error_for_status()
        .with_context(|| format!("Release asset download failed with error status: {}", url))?;

    let (bytes, digest) = write_atomically(&mut response, destination)?;
    info!(
        "Downloaded {} bytes to {:?} (sha256: {})",
        bytes, destination, digest
    );
    Ok(())
}

#[cfg(test)]
#[path = "../tests/download_tests.rs"]
mod tests;
