use anyhow::{Context, Result};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::ConfigManager;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Initialize the logging system
///
/// Console output is controlled with `RUST_LOG` (`error`, `warn`, `info`,
/// `debug`, `trace` or `off`) and defaults to `info`.
///
/// Remote mutations are additionally appended to `docsync.log` in the config
/// directory via [`log_to_file`]:
/// - Linux: `$XDG_CONFIG_HOME/docsync/docsync.log` or `~/.config/docsync/docsync.log`
/// - macOS: `~/Library/Application Support/docsync/docsync.log`
/// - Windows: `%APPDATA%\docsync\docsync.log`
///
/// ```bash
/// RUST_LOG=debug docsync status
/// ```
pub fn init_logger() -> Result<()> {
    ConfigManager::ensure_config_dir()?;

    let default_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:5}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(default_level)
        .target(env_logger::Target::Stdout)
        .try_init()
        .ok(); // already initialized in tests

    rotate_log_if_needed()?;
    Ok(())
}

/// Append a timestamped line to the audit log
pub fn log_to_file(message: &str) -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;
    append_line(&log_path, message)
}

fn append_line(path: &Path, message: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        message
    )?;

    Ok(())
}

/// Move the log aside to `docsync.log.old` once it exceeds 10 MB
pub fn rotate_log_if_needed() -> Result<()> {
    let log_path = ConfigManager::log_file_path()?;
    rotate_if_larger(&log_path, MAX_LOG_SIZE)
}

fn rotate_if_larger(path: &Path, max_size: u64) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let metadata = std::fs::metadata(path)?;
    if metadata.len() <= max_size {
        return Ok(());
    }

    let old_log_path = path.with_extension("log.old");
    if old_log_path.exists() {
        std::fs::remove_file(&old_log_path)?;
    }
    std::fs::rename(path, &old_log_path)?;

    log::info!("Log file rotated to {}", old_log_path.display());
    Ok(())
}
