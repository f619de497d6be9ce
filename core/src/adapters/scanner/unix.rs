//! Unix port scanner implementation using lsof and ps.
//!
//! TCP and UDP sockets are listed separately. Each unique row gets a full
//! command lookup; interpreter processes also get a working-directory probe
//! so the list can show which project a `node` or `python` belongs to.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use tracing::debug;

use crate::domain::{is_interpreter, normalize_process_name, PortProcess, Protocol};
use crate::ports::CommandRunner;

use super::ss;
use super::utils::{split_address, truncate_chars};

/// lsof arguments for listening TCP sockets.
///
/// - -iTCP: Show only TCP connections
/// - -sTCP:LISTEN: Show only listening sockets
/// - -P: Show port numbers (don't resolve to service names)
/// - -n: Show IP addresses (don't resolve to hostnames)
/// - +c 0: Show full command name (unlimited length)
const LSOF_TCP_ARGS: &[&str] = &["-iTCP", "-sTCP:LISTEN", "-P", "-n", "+c", "0"];

/// lsof arguments for UDP sockets.
const LSOF_UDP_ARGS: &[&str] = &["-iUDP", "-P", "-n", "+c", "0"];

/// Columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME
const LSOF_MIN_FIELDS: usize = 9;

/// UDP rows carry a shortened command line.
const UDP_COMMAND_MAX_CHARS: usize = 100;

/// One usable row of lsof output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LsofRow {
    pub process_name: String,
    pub pid: u32,
    pub user: String,
    pub address: String,
    pub port: u16,
}

/// Dedup key. UDP gets its own key space so a UDP row never hides the TCP
/// row of the same `(pid, port)`; the two are reconciled by the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SeenKey {
    pid: u32,
    port: u16,
    udp: bool,
}

/// Per-scan cache so a process listening on many ports is probed once.
#[derive(Default)]
pub(super) struct ProbeCache {
    commands: HashMap<u32, String>,
    cwds: HashMap<u32, Option<String>>,
}

/// Unix-specific port scanner.
pub struct UnixScanner<R> {
    runner: R,
    interpreters: Vec<String>,
    /// Enables the `ss` fallback when lsof is unavailable.
    linux: bool,
    /// procfs mount used as a last resort for working directories.
    proc_root: Option<PathBuf>,
}

impl<R: CommandRunner> UnixScanner<R> {
    /// Create a new Unix scanner.
    pub fn new(runner: R, interpreters: Vec<String>, linux: bool) -> Self {
        Self {
            runner,
            interpreters,
            linux,
            proc_root: linux.then(|| PathBuf::from("/proc")),
        }
    }

    /// Use a different procfs root, or none.
    pub fn with_proc_root(mut self, proc_root: Option<PathBuf>) -> Self {
        self.proc_root = proc_root;
        self
    }

    /// Scan listening TCP and open UDP sockets.
    pub async fn scan(&self) -> Vec<PortProcess> {
        let tcp_output = self.runner.run("lsof", LSOF_TCP_ARGS).await;
        let udp_output = self.runner.run("lsof", LSOF_UDP_ARGS).await;

        if tcp_output.is_empty() && udp_output.is_empty() {
            if self.linux {
                debug!("lsof returned nothing, falling back to ss");
                return self.scan_ss().await;
            }
            return Vec::new();
        }

        let mut seen: HashSet<SeenKey> = HashSet::new();
        let mut cache = ProbeCache::default();
        let mut candidates = Vec::new();

        for row in parse_lsof_output(&tcp_output) {
            let key = SeenKey { pid: row.pid, port: row.port, udp: false };
            if !seen.insert(key) {
                continue;
            }

            let command = self.command_for(row.pid, &mut cache).await;
            let cwd = self.cwd_for(row.pid, &row.process_name, &mut cache).await;
            candidates.push(
                PortProcess::new(row.pid, row.port, Protocol::Tcp, "LISTEN", row.address, row.process_name)
                    .with_command(command)
                    .with_user(Some(row.user))
                    .with_cwd(cwd),
            );
        }

        for row in parse_lsof_output(&udp_output) {
            let key = SeenKey { pid: row.pid, port: row.port, udp: true };
            if !seen.insert(key) {
                continue;
            }

            let command = self.command_for(row.pid, &mut cache).await;
            let cwd = self.cwd_for(row.pid, &row.process_name, &mut cache).await;
            candidates.push(
                PortProcess::new(row.pid, row.port, Protocol::Udp, "OPEN", row.address, row.process_name)
                    .with_command(truncate_chars(&command, UDP_COMMAND_MAX_CHARS))
                    .with_user(Some(row.user))
                    .with_cwd(cwd),
            );
        }

        debug!(count = candidates.len(), "lsof scan finished");
        candidates
    }

    /// `ps` detail dump for the Details view.
    pub async fn describe(&self, pid: u32) -> String {
        let pid = pid.to_string();
        self.runner
            .run("ps", &["-p", &pid, "-o", "pid,ppid,user,%cpu,%mem,etime,command"])
            .await
    }

    /// Linux fallback for hosts without lsof.
    async fn scan_ss(&self) -> Vec<PortProcess> {
        let tcp_output = self.runner.run("ss", &["-Htlnp"]).await;
        let udp_output = self.runner.run("ss", &["-Hulnp"]).await;
        if tcp_output.is_empty() && udp_output.is_empty() {
            return Vec::new();
        }

        let processes = ss::parse_ps_table(&self.runner.run("ps", &["-axo", "pid=,user=,command="]).await);
        let mut cache = ProbeCache::default();
        let mut candidates = Vec::new();

        let listings = [
            (tcp_output, Protocol::Tcp, "LISTEN"),
            (udp_output, Protocol::Udp, "OPEN"),
        ];
        for (output, protocol, state) in listings {
            for row in ss::parse_ss_output(&output) {
                let info = processes.get(&row.pid);
                let cwd = self.cwd_for(row.pid, &row.process_name, &mut cache).await;
                candidates.push(
                    PortProcess::new(row.pid, row.port, protocol, state, row.address, row.process_name)
                        .with_command(info.map(|i| i.command.clone()).unwrap_or_default())
                        .with_user(info.map(|i| i.user.clone()))
                        .with_cwd(cwd),
                );
            }
        }

        debug!(count = candidates.len(), "ss scan finished");
        candidates
    }

    async fn command_for(&self, pid: u32, cache: &mut ProbeCache) -> String {
        if let Some(command) = cache.commands.get(&pid) {
            return command.clone();
        }

        let pid_arg = pid.to_string();
        let command = self.runner.run("ps", &["-p", &pid_arg, "-o", "command="]).await;
        cache.commands.insert(pid, command.clone());
        command
    }

    async fn cwd_for(&self, pid: u32, process_name: &str, cache: &mut ProbeCache) -> Option<String> {
        if !is_interpreter(process_name, &self.interpreters) {
            return None;
        }
        if let Some(cwd) = cache.cwds.get(&pid) {
            return cwd.clone();
        }

        let pid_arg = pid.to_string();
        let output = self.runner.run("lsof", &["-a", "-p", &pid_arg, "-d", "cwd"]).await;
        let mut cwd = parse_cwd_output(&output);

        if cwd.is_none() {
            if let Some(root) = &self.proc_root {
                cwd = tokio::fs::read_link(root.join(&pid_arg).join("cwd"))
                    .await
                    .ok()
                    .map(|path| path.to_string_lossy().into_owned())
                    .filter(|path| !path.is_empty() && path != "/");
            }
        }

        cache.cwds.insert(pid, cwd.clone());
        cwd
    }
}

/// Parse lsof output into rows.
///
/// Expected lsof output format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// ```
pub(super) fn parse_lsof_output(output: &str) -> Vec<LsofRow> {
    let mut rows = Vec::new();

    // Skip header line
    for line in output.lines().skip(1) {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < LSOF_MIN_FIELDS {
            continue;
        }

        let pid: u32 = match components[1].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        // NAME is the last column with a colon that isn't a device or offset.
        let Some(name) = components[LSOF_MIN_FIELDS - 1..]
            .iter()
            .rev()
            .find(|c| c.contains(':') && !c.starts_with("0x") && !c.starts_with("0t"))
        else {
            continue;
        };

        // Connected sockets print `local->remote`.
        let local = name.split("->").next().unwrap_or(name);
        let Some((address, port)) = split_address(local) else {
            continue;
        };

        rows.push(LsofRow {
            process_name: normalize_process_name(components[0]),
            pid,
            user: components[2].to_string(),
            address,
            port,
        });
    }

    rows
}

/// Extract the working directory from `lsof -a -p PID -d cwd` output.
///
/// The path is everything from the NAME column on, so paths with spaces
/// survive. The filesystem root is treated as "no useful directory".
pub(super) fn parse_cwd_output(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < LSOF_MIN_FIELDS || components[3] != "cwd" {
            return None;
        }
        let path = components[LSOF_MIN_FIELDS - 1..].join(" ");
        (!path.is_empty() && path != "/").then_some(path)
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeRunner;
    use super::*;

    const TCP_OUTPUT: &str = r#"COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
nginx        1  root    6u  IPv4 0x1234567890abcdef      0t0  TCP *:80 (LISTEN)
nginx        1  root    7u  IPv6 0x1234567890abcdee      0t0  TCP *:80 (LISTEN)
"#;

    const UDP_OUTPUT: &str = r#"COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
nginx        1  root    9u  IPv4 0x1234567890abcdea      0t0  UDP *:80
mDNSRespo  411  _mdns   8u  IPv4 0x1234567890abcde0      0t0  UDP 192.168.1.5:50000->8.8.8.8:53
"#;

    fn interpreters() -> Vec<String> {
        vec!["node".to_string(), "python".to_string()]
    }

    fn scanner(runner: FakeRunner) -> UnixScanner<FakeRunner> {
        UnixScanner::new(runner, interpreters(), false)
    }

    #[test]
    fn test_parse_lsof_output() {
        let rows = parse_lsof_output(TCP_OUTPUT);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].process_name, "node");
        assert_eq!(rows[0].pid, 34805);
        assert_eq!(rows[0].user, "code");
        assert_eq!(rows[0].address, "[::1]");
        assert_eq!(rows[0].port, 3000);

        assert_eq!(rows[1].address, "0.0.0.0");
        assert_eq!(rows[1].port, 80);
    }

    #[test]
    fn test_unescape_process_name() {
        let output = r#"COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
Code\x20Helper  1234  user   10u  IPv4 0x1234567890abcdef      0t0  TCP *:3000 (LISTEN)
"#;
        let rows = parse_lsof_output(output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].process_name, "Code Helper");
    }

    #[test]
    fn test_skips_short_and_malformed_rows() {
        let output = r#"COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
short row only
node     abc  code   19u  IPv4 0x3d8015e195af1f3f      0t0  TCP *:3000 (LISTEN)
node     123  code   19u  IPv4 0x3d8015e195af1f3f      0t0  TCP *:http (LISTEN)
node     124  code   19u  IPv4 0x3d8015e195af1f3f      0t0  TCP *:4000 (LISTEN)
"#;
        let rows = parse_lsof_output(output);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pid, 124);
    }

    #[test]
    fn test_connected_udp_uses_local_port() {
        let rows = parse_lsof_output(UDP_OUTPUT);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].address, "192.168.1.5");
        assert_eq!(rows[1].port, 50000);
    }

    #[test]
    fn test_parse_cwd_output() {
        let output = r#"COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF     NODE NAME
node    34805 code  cwd    DIR   1,18      640 12345678 /Users/code/my project"#;
        assert_eq!(parse_cwd_output(output), Some("/Users/code/my project".to_string()));

        let root = "node 1 code cwd DIR 1,18 640 2 /";
        assert_eq!(parse_cwd_output(root), None);
        assert_eq!(parse_cwd_output(""), None);
    }

    #[tokio::test]
    async fn test_scan_builds_candidates() {
        let runner = FakeRunner::new()
            .respond("lsof -iTCP -sTCP:LISTEN -P -n +c 0", TCP_OUTPUT)
            .respond("lsof -iUDP -P -n +c 0", UDP_OUTPUT)
            .respond("ps -p 34805 -o command=", "node /srv/app/server.js")
            .respond("ps -p 1 -o command=", "nginx: master process /usr/sbin/nginx")
            .respond(
                "lsof -a -p 34805 -d cwd",
                "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME\nnode 34805 code cwd DIR 1,18 640 9 /srv/app",
            );

        let candidates = scanner(runner).scan().await;
        assert_eq!(candidates.len(), 4);

        let node = &candidates[0];
        assert_eq!(node.protocol, Protocol::Tcp);
        assert_eq!(node.state, "LISTEN");
        assert_eq!(node.command, "node /srv/app/server.js");
        assert_eq!(node.user.as_deref(), Some("code"));
        assert_eq!(node.cwd.as_deref(), Some("/srv/app"));

        let nginx_tcp = &candidates[1];
        assert_eq!((nginx_tcp.port, nginx_tcp.pid), (80, 1));
        assert_eq!(nginx_tcp.address, "0.0.0.0");
        assert!(nginx_tcp.cwd.is_none());

        let nginx_udp = &candidates[2];
        assert_eq!((nginx_udp.port, nginx_udp.pid, nginx_udp.protocol), (80, 1, Protocol::Udp));
        assert_eq!(nginx_udp.state, "OPEN");

        // No ps output: command falls back to the process name.
        assert_eq!(candidates[3].command, "mDNSRespo");
    }

    #[tokio::test]
    async fn test_probes_once_per_pid_and_only_for_interpreters() {
        let runner = FakeRunner::new()
            .respond("lsof -iTCP -sTCP:LISTEN -P -n +c 0", TCP_OUTPUT)
            .respond("lsof -iUDP -P -n +c 0", UDP_OUTPUT);

        let scanner = scanner(runner);
        scanner.scan().await;

        let runner = &scanner.runner;
        assert_eq!(runner.count("ps -p 1 -o command="), 1);
        assert_eq!(runner.count("lsof -a -p 34805 -d cwd"), 1);
        assert_eq!(runner.count("lsof -a -p 1 -d cwd"), 0);
        assert_eq!(runner.count("lsof -a -p 411 -d cwd"), 0);
    }

    #[tokio::test]
    async fn test_udp_command_is_truncated() {
        let long_command = format!("python {}", "x".repeat(200));
        let udp = "COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME\npython 7 dev 3u IPv4 0x1 0t0 UDP *:5000";
        let runner = FakeRunner::new()
            .respond("lsof -iUDP -P -n +c 0", udp)
            .respond("ps -p 7 -o command=", &long_command);

        let candidates = scanner(runner).scan().await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].command.chars().count(), 100);
    }

    #[tokio::test]
    async fn test_no_listing_is_empty() {
        let scanner = scanner(FakeRunner::new());
        assert!(scanner.scan().await.is_empty());

        // Without the Linux fallback nothing else is tried.
        assert_eq!(
            scanner.runner.calls(),
            vec!["lsof -iTCP -sTCP:LISTEN -P -n +c 0", "lsof -iUDP -P -n +c 0"]
        );
    }

    #[tokio::test]
    async fn test_linux_falls_back_to_ss() {
        let runner = FakeRunner::new()
            .respond(
                "ss -Htlnp",
                r#"LISTEN 0 4096 127.0.0.1:5432 0.0.0.0:* users:(("postgres",pid=812,fd=7))"#,
            )
            .respond(
                "ss -Hulnp",
                r#"UNCONN 0 0 0.0.0.0:5353 0.0.0.0:* users:(("avahi-daemon",pid=640,fd=12))"#,
            )
            .respond(
                "ps -axo pid=,user=,command=",
                "  812 postgres /usr/lib/postgresql/16/bin/postgres -D /var/lib/postgresql\n  640 avahi avahi-daemon: running",
            );

        let scanner = UnixScanner::new(runner, interpreters(), true).with_proc_root(None);
        let candidates = scanner.scan().await;
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].port, 5432);
        assert_eq!(candidates[0].protocol, Protocol::Tcp);
        assert_eq!(candidates[0].user.as_deref(), Some("postgres"));
        assert_eq!(candidates[0].command, "/usr/lib/postgresql/16/bin/postgres -D /var/lib/postgresql");

        assert_eq!(candidates[1].port, 5353);
        assert_eq!(candidates[1].protocol, Protocol::Udp);
        assert_eq!(candidates[1].state, "OPEN");
    }
}
