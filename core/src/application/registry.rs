//! Registry of listening ports, refreshed by scanning.

use parking_lot::RwLock;
use tracing::debug;

use crate::domain::{merge_protocols, PortProcess};
use crate::ports::PortScannerPort;

/// Holds the current snapshot of merged, port-sorted entities.
///
/// The scanner is injected through `PortScannerPort`, so tests can drive the
/// registry with canned candidates. A refresh swaps the whole snapshot at
/// once; readers see either the old list or the new one.
pub struct ProcessRegistry<S: PortScannerPort> {
    scanner: S,
    snapshot: RwLock<Vec<PortProcess>>,
}

impl<S: PortScannerPort> ProcessRegistry<S> {
    /// Create an empty registry over the given scanner.
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Scan, merge protocols, sort by port and publish the result.
    ///
    /// Returns the number of entities in the new snapshot.
    pub async fn refresh(&self) -> usize {
        let candidates = self.scanner.scan().await;
        let candidate_count = candidates.len();

        let mut entities = merge_protocols(candidates);
        entities.sort_by_key(|p| p.port);

        let count = entities.len();
        *self.snapshot.write() = entities;
        debug!(candidates = candidate_count, entities = count, "registry refreshed");
        count
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> Vec<PortProcess> {
        self.snapshot.read().clone()
    }

    /// Detail text for the process, as reported by the scanner.
    pub async fn describe(&self, pid: u32) -> String {
        self.scanner.describe(pid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Protocol;
    use std::sync::Arc;

    /// Mock scanner for testing.
    struct MockScanner {
        candidates: Arc<RwLock<Vec<PortProcess>>>,
    }

    impl MockScanner {
        fn new(candidates: Vec<PortProcess>) -> Self {
            Self {
                candidates: Arc::new(RwLock::new(candidates)),
            }
        }
    }

    impl PortScannerPort for MockScanner {
        async fn scan(&self) -> Vec<PortProcess> {
            self.candidates.read().clone()
        }

        async fn describe(&self, pid: u32) -> String {
            format!("details for {pid}")
        }
    }

    fn candidate(port: u16, pid: u32, protocol: Protocol, name: &str) -> PortProcess {
        PortProcess::new(pid, port, protocol, "LISTEN", "0.0.0.0", name)
    }

    #[tokio::test]
    async fn test_registry_refresh_merges_and_sorts() {
        let candidates = vec![
            candidate(8080, 5678, Protocol::Tcp, "nginx"),
            candidate(53, 99, Protocol::Udp, "dnsmasq"),
            candidate(3000, 1234, Protocol::Tcp, "node"),
            candidate(3000, 1234, Protocol::Udp, "node"),
        ];
        let registry = ProcessRegistry::new(MockScanner::new(candidates));

        // Initially empty
        assert!(registry.snapshot().is_empty());

        assert_eq!(registry.refresh().await, 3);
        let snapshot = registry.snapshot();
        let ports: Vec<u16> = snapshot.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![53, 3000, 8080]);
        assert_eq!(snapshot[1].protocol, Protocol::Both);
    }

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let scanner = MockScanner::new(vec![candidate(3000, 1, Protocol::Tcp, "node")]);
        let candidates = Arc::clone(&scanner.candidates);
        let registry = ProcessRegistry::new(scanner);

        assert_eq!(registry.refresh().await, 1);
        assert_eq!(registry.snapshot().len(), 1);

        *candidates.write() = Vec::new();
        assert_eq!(registry.refresh().await, 0);
        assert!(registry.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_describe_delegates_to_scanner() {
        let registry = ProcessRegistry::new(MockScanner::new(Vec::new()));
        assert_eq!(registry.describe(7).await, "details for 7");
    }
}
