//! Windows port scanner implementation using netstat and tasklist.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{PortProcess, Protocol};
use crate::ports::CommandRunner;

use super::utils::split_address;

/// Name shown when tasklist has no answer for a PID.
const UNKNOWN_PROCESS: &str = "unknown";

/// One LISTENING row of `netstat -ano -p TCP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct NetstatRow {
    pub pid: u32,
    pub address: String,
    pub port: u16,
}

/// Windows-specific port scanner.
pub struct WindowsScanner<R> {
    runner: R,
}

impl<R: CommandRunner> WindowsScanner<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Scan listening TCP sockets. UDP is not listed on Windows.
    pub async fn scan(&self) -> Vec<PortProcess> {
        let output = self.runner.run("netstat", &["-ano", "-p", "TCP"]).await;
        if output.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for row in parse_netstat_output(&output) {
            let process_name = self.process_name(row.pid).await;
            candidates.push(PortProcess::new(
                row.pid,
                row.port,
                Protocol::Tcp,
                "LISTENING",
                row.address,
                process_name,
            ));
        }

        debug!(count = candidates.len(), "netstat scan finished");
        candidates
    }

    /// Verbose tasklist entry for the Details view.
    pub async fn describe(&self, pid: u32) -> String {
        let filter = format!("PID eq {pid}");
        self.runner
            .run("tasklist", &["/FI", &filter, "/V", "/FO", "LIST"])
            .await
    }

    async fn process_name(&self, pid: u32) -> String {
        let filter = format!("PID eq {pid}");
        let output = self
            .runner
            .run("tasklist", &["/FI", &filter, "/FO", "CSV", "/NH"])
            .await;
        parse_tasklist_name(&output)
    }
}

/// Parse netstat output, keeping LISTENING rows once per `(pid, port)`.
///
/// ```text
/// Active Connections
///
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1234
/// ```
///
/// Headers are skipped by content rather than by position, since the
/// runner trims leading blank lines.
pub(super) fn parse_netstat_output(output: &str) -> Vec<NetstatRow> {
    let mut rows = Vec::new();
    let mut seen: HashSet<(u32, u16)> = HashSet::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 || parts[3] != "LISTENING" {
            continue;
        }

        let Some((address, port)) = split_address(parts[1]) else {
            continue;
        };
        let pid: u32 = match parts[4].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        if !seen.insert((pid, port)) {
            continue;
        }

        rows.push(NetstatRow { pid, address, port });
    }

    rows
}

/// First CSV field of `tasklist /FO CSV /NH`, unquoted.
///
/// tasklist prints an `INFO:` line instead of a row when nothing matches.
pub(super) fn parse_tasklist_name(output: &str) -> String {
    let line = output.lines().next().unwrap_or_default().trim();
    if line.is_empty() || line.starts_with("INFO:") {
        return UNKNOWN_PROCESS.to_string();
    }

    let name = line.split(',').next().unwrap_or_default().replace('"', "");
    if name.is_empty() {
        UNKNOWN_PROCESS.to_string()
    } else {
        name
    }
}
