//! Tracing setup.
//!
//! The TUI owns the terminal, so log output goes to a plain-text file instead
//! of stderr. `RUST_LOG` overrides the configured level.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install the global subscriber. Logging is optional: if the log file cannot
/// be opened the client runs without it.
pub fn init_logging(config: &Config) {
    let Some(log_path) = config.log_path() else {
        return;
    };

    if let Some(parent) = log_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    tracing::debug!(path = %log_path.display(), "logging initialized");
}
