//! Process killer port (interface).

use crate::error::Result;

/// Port for killing processes.
///
/// This trait defines the interface for process termination.
/// Implementations handle platform-specific signal handling.
pub trait ProcessKillerPort: Send + Sync {
    /// Kill a process by PID.
    ///
    /// Sends the graceful termination signal, or the forceful one when
    /// `force` is true. There is no escalation or retry; failures carry the
    /// OS error text in [`crate::Error::KillFailed`].
    fn kill(&self, pid: u32, force: bool) -> impl std::future::Future<Output = Result<()>> + Send;
}
