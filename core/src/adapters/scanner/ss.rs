//! Parsers for the Linux `ss` fallback.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use super::utils::split_address;

/// One socket row from `ss -H{t,u}lnp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SsRow {
    pub process_name: String,
    pub pid: u32,
    pub address: String,
    pub port: u16,
}

/// User and full command line of a running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ProcessInfo {
    pub user: String,
    pub command: String,
}

fn users_regex() -> &'static Regex {
    static USERS: OnceLock<Regex> = OnceLock::new();
    USERS.get_or_init(|| {
        Regex::new(r#"users:\(\("(.+?)",pid=(\d+),fd=(\d+)\)"#).expect("users regex is valid")
    })
}

/// Parse `ss` output. Only the first owning process of each socket is kept,
/// and `(port, pid)` pairs are reported once.
///
/// ```text
/// LISTEN 0 4096 127.0.0.1:5432 0.0.0.0:* users:(("postgres",pid=812,fd=7))
/// ```
pub(super) fn parse_ss_output(output: &str) -> Vec<SsRow> {
    let mut rows = Vec::new();
    let mut seen: HashSet<(u16, u32)> = HashSet::new();

    for line in output.lines() {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 6 {
            continue;
        }

        let Some(caps) = users_regex().captures(components[5]) else {
            continue;
        };

        let pid: u32 = match caps[2].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        let Some((address, port)) = split_address(components[3]) else {
            continue;
        };

        if !seen.insert((port, pid)) {
            continue;
        }

        rows.push(SsRow {
            process_name: caps[1].to_string(),
            pid,
            address,
            port,
        });
    }

    rows
}

/// Parse `ps -axo pid=,user=,command=` into a pid lookup table.
pub(super) fn parse_ps_table(output: &str) -> HashMap<u32, ProcessInfo> {
    let mut infos = HashMap::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let pid: u32 = match parts[0].parse() {
            Ok(p) => p,
            Err(_) => continue,
        };

        infos.insert(
            pid,
            ProcessInfo {
                user: parts[1].to_string(),
                command: parts[2..].join(" "),
            },
        );
    }

    infos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ss_output() {
        let output = r#"LISTEN 0 4096 127.0.0.1:5432 0.0.0.0:* users:(("postgres",pid=812,fd=7))
LISTEN 0 511 *:80 *:* users:(("nginx",pid=1001,fd=6),("nginx",pid=1002,fd=6))
LISTEN 0 128 [::]:22 [::]:* users:(("sshd",pid=700,fd=4))
LISTEN 0 128 [::]:22 [::]:* users:(("sshd",pid=700,fd=5))
LISTEN 0 128 0.0.0.0:631 0.0.0.0:*"#;

        let rows = parse_ss_output(output);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].process_name, "postgres");
        assert_eq!(rows[0].pid, 812);
        assert_eq!(rows[0].address, "127.0.0.1");
        assert_eq!(rows[0].port, 5432);

        assert_eq!(rows[1].pid, 1001);
        assert_eq!(rows[1].address, "0.0.0.0");

        assert_eq!(rows[2].address, "[::]");
        assert_eq!(rows[2].port, 22);
    }

    #[test]
    fn test_parse_ps_table() {
        let output = "  812 postgres /usr/bin/postgres -D /var/lib/pg\n  bad line here\n  9 root";
        let table = parse_ps_table(output);
        assert_eq!(table.len(), 1);

        let info = &table[&812];
        assert_eq!(info.user, "postgres");
        assert_eq!(info.command, "/usr/bin/postgres -D /var/lib/pg");
    }
}
