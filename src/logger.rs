use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use file_rotate::compression::Compression;
use file_rotate::suffix::{AppendTimestamp, DateFrom, FileLimit};
use file_rotate::{ContentLimit, FileRotate};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;

pub const LOG_FILE_NAME: &str = "tmc.log";
const DEFAULT_MAX_LOG_FILE_SIZE_MB: u64 = 20;
// The updater logs a handful of lines per run, a few generations are plenty.
const KEPT_LOG_GENERATIONS: usize = 5;
const ROTATED_SUFFIX_FORMAT: &str = "%Y%m%d-%H%M%S";
const DEFAULT_FILTER: &str = "warn";

/// Rotation threshold in bytes; 0 MB falls back to the default size.
pub fn rotation_limit_bytes(max_log_file_size_mb: u64) -> Result<usize> {
    let size_mb = match max_log_file_size_mb {
        0 => DEFAULT_MAX_LOG_FILE_SIZE_MB,
        mb => mb,
    };
    size_mb
        .checked_mul(1024 * 1024)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| anyhow::anyhow!("max_log_file_size_mb is too large: {}", size_mb))
}

/// Opens `tmc.log` under `log_dir`, creating the directory first. Older
/// generations are gzipped on rotation.
fn open_log_file(log_dir: &Path, max_bytes: usize) -> Result<FileRotate<AppendTimestamp>> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    let suffix = AppendTimestamp::with_format(
        ROTATED_SUFFIX_FORMAT,
        FileLimit::MaxFiles(KEPT_LOG_GENERATIONS),
        DateFrom::Now,
    );
    let log_file = log_dir.join(LOG_FILE_NAME);

    #[cfg(unix)]
    let rotate = FileRotate::new(
        log_file,
        suffix,
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::OnRotate(1),
        None,
    );
    #[cfg(not(unix))]
    let rotate = FileRotate::new(
        log_file,
        suffix,
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::OnRotate(1),
    );

    Ok(rotate)
}

/// The checking process and the relaunched installer share one log file, so
/// every line carries the writer's pid.
fn builder() -> Builder {
    let pid = std::process::id();
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    builder.format(move |buf, record| {
        writeln!(
            buf,
            "[{} {:<5} {} {}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            pid,
            record.target(),
            record.args()
        )
    });
    builder
}

fn init_file_logging(log_dir: &Path, max_log_file_size_mb: u64) -> Result<()> {
    let max_bytes = rotation_limit_bytes(max_log_file_size_mb)?;
    let log_file = open_log_file(log_dir, max_bytes)?;

    builder()
        .target(Target::Pipe(Box::new(log_file)))
        .try_init()?;

    debug!(
        "Logging to {:?} (rotate at {} bytes)",
        log_dir.join(LOG_FILE_NAME),
        max_bytes
    );
    Ok(())
}

/// Logs to `<log_dir>/tmc.log` when a directory is known and usable, otherwise
/// to stderr.
pub fn init(log_dir: Option<&Path>, max_log_file_size_mb: u64) {
    if let Some(log_dir) = log_dir {
        if init_file_logging(log_dir, max_log_file_size_mb).is_ok() {
            return;
        }
    }
    let _ = builder().try_init();
}

#[cfg(test)]
#[path = "tests/logger_tests.rs"]
mod tests;
