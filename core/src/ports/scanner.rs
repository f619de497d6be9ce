//! Port scanner port (interface).

use crate::domain::PortProcess;

/// Port for scanning network ports.
///
/// This trait defines the interface for port scanning functionality.
/// Implementations handle platform-specific details (lsof, netstat, etc.)
pub trait PortScannerPort: Send + Sync {
    /// Scan for candidate entities on all supported protocols.
    ///
    /// Candidates are not merged across protocols. A failed listing yields
    /// an empty set rather than an error.
    fn scan(&self) -> impl std::future::Future<Output = Vec<PortProcess>> + Send;

    /// Free-form detail text for one process, shown verbatim.
    fn describe(&self, pid: u32) -> impl std::future::Future<Output = String> + Send;
}
