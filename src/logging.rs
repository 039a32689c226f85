// The terminal belongs to the TUI, so log lines go to a file.

use anyhow::{Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Base level plus quieter defaults for the driver crates.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    // RUST_LOG replaces the configured level entirely
    if let Ok(from_env) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(&from_env)
            .map_err(|e| anyhow!("Invalid RUST_LOG filter '{}': {}", from_env, e));
    }

    let directives = [
        level.to_string(),
        "tokio_postgres=warn".to_string(),
        "postgres_protocol=warn".to_string(),
    ];
    let filter = directives.join(",");
    EnvFilter::try_new(&filter).map_err(|e| anyhow!("Invalid log filter '{}': {}", filter, e))
}

/// Installs the global subscriber writing to `file_path` in append mode.
pub fn init(level: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new().create(true).append(true).open(file_path)?;

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(log_file))
        .with_env_filter(build_env_filter(level)?)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))?;

    tracing::debug!(level, file = %file_path.display(), "logging initialized");
    Ok(())
}
