//! Diagnostic logging.
//!
//! Off unless `PORTPATROL_LOG` holds a filter directive such as `debug` or
//! `portpatrol_core=trace`. The TUI owns the terminal, so records go to the
//! log file from the settings.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use portpatrol_core::Settings;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PORTPATROL_LOG";

pub fn init(settings: &Settings) -> Result<()> {
    let directive = match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(()),
    };

    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid {LOG_ENV} filter: {directive}"))?;

    let path = settings.log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init();

    Ok(())
}
