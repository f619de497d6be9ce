//! Session settings.
//!
//! Read from `~/.portpatrol/config.json` when present. The file is never
//! written by Port Patrol; a missing file means defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{Error, Result};

/// Process names (substrings, case-insensitive) that get a working-directory probe.
pub const DEFAULT_INTERPRETERS: &[&str] = &["node", "python", "ruby", "php", "java", "deno", "bun"];

/// Settings data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Delay between a successful kill and the follow-up rescan.
    #[serde(default = "default_refresh_delay_ms", rename = "refreshDelayMs")]
    pub refresh_delay_ms: u64,

    /// How long status messages stay visible.
    #[serde(default = "default_message_timeout_ms", rename = "messageTimeoutMs")]
    pub message_timeout_ms: u64,

    /// Input poll interval of the UI loop.
    #[serde(default = "default_tick_rate_ms", rename = "tickRateMs")]
    pub tick_rate_ms: u64,

    /// Interpreter families whose working directory is probed.
    #[serde(default = "default_interpreters")]
    pub interpreters: Vec<String>,

    /// Where log output goes when `PORTPATROL_LOG` is set.
    #[serde(default, rename = "logFile")]
    pub log_file: Option<PathBuf>,
}

fn default_refresh_delay_ms() -> u64 {
    500
}

fn default_message_timeout_ms() -> u64 {
    3000
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_interpreters() -> Vec<String> {
    DEFAULT_INTERPRETERS.iter().map(|s| s.to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_delay_ms: default_refresh_delay_ms(),
            message_timeout_ms: default_message_timeout_ms(),
            tick_rate_ms: default_tick_rate_ms(),
            interpreters: default_interpreters(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    /// Log file path, defaulting to `portpatrol.log` in the temp directory.
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("portpatrol.log"))
    }
}

/// Read-only settings source.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a store for the default path `~/.portpatrol/config.json`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".portpatrol").join("config.json"),
        })
    }

    /// Create a store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load settings from disk.
    ///
    /// Returns defaults if the file doesn't exist.
    pub async fn load(&self) -> Result<Settings> {
        if !self.config_path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path).await?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }
}
