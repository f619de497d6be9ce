//! Error types for the portpatrol-core library.

use thiserror::Error;

/// Result type alias for portpatrol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core.
///
/// Scan probes and row parsing never produce errors; they degrade to fewer
/// results. Only process termination and settings loading report failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to terminate a process. `reason` is the OS error text.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The operator-facing reason for a failure, without the pid prefix.
    pub fn reason(&self) -> String {
        match self {
            Error::KillFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}
