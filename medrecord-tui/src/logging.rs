//! Tracing setup. The terminal belongs to the UI, so events go to a log file.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "MEDRECORD_LOG";

const DEFAULT_FILTER: &str = "medrecord_core=info,medrecord_tui=info";

/// Build the filter from `MEDRECORD_LOG`, falling back to info for our crates.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a subscriber that appends to `log_file`.
pub fn init_tracing(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}
