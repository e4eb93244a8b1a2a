//! Log output setup.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Default log file while the dashboard owns the terminal.
pub const DEFAULT_LOG_FILE: &str = "feedrate.log";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr.
pub fn init_stderr() {
    fmt()
        .with_env_filter(filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Append logs to `path`, creating it if needed.
pub fn init_file(path: &Path) -> Result<()> {
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
