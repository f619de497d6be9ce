//! TCP/UDP candidate reconciliation.

use std::collections::HashMap;

use super::{PortProcess, Protocol};

/// Collapse candidates sharing a `(port, pid)` into one entity.
///
/// The first candidate seen for a key is kept. A later candidate with a
/// different protocol promotes it to [`Protocol::Both`]. Output keeps the
/// order in which keys were first seen.
pub fn merge_protocols(candidates: Vec<PortProcess>) -> Vec<PortProcess> {
    let mut index: HashMap<(u16, u32), usize> = HashMap::with_capacity(candidates.len());
    let mut merged: Vec<PortProcess> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match index.get(&(candidate.port, candidate.pid)) {
            Some(&i) => {
                let existing = &mut merged[i];
                if existing.protocol != candidate.protocol {
                    existing.protocol = Protocol::Both;
                }
            }
            None => {
                index.insert((candidate.port, candidate.pid), merged.len());
                merged.push(candidate);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn candidate(port: u16, pid: u32, protocol: Protocol) -> PortProcess {
        PortProcess::new(pid, port, protocol, "LISTEN", "0.0.0.0", "proc")
    }

    #[test]
    fn test_merge_tcp_and_udp() {
        let merged = merge_protocols(vec![
            candidate(22, 1, Protocol::Tcp),
            candidate(80, 2, Protocol::Tcp),
            candidate(80, 2, Protocol::Udp),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!((merged[0].port, merged[0].pid, merged[0].protocol), (22, 1, Protocol::Tcp));
        assert_eq!((merged[1].port, merged[1].pid, merged[1].protocol), (80, 2, Protocol::Both));
    }

    #[test]
    fn test_first_candidate_is_canonical() {
        let tcp = candidate(53, 9, Protocol::Tcp).with_command("dnsmasq --keep-in-foreground");
        let udp = candidate(53, 9, Protocol::Udp).with_command("something else");

        let merged = merge_protocols(vec![tcp, udp]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].command, "dnsmasq --keep-in-foreground");
        assert_eq!(merged[0].state, "LISTEN");
    }

    #[test]
    fn test_same_protocol_duplicates_do_not_promote() {
        let merged = merge_protocols(vec![
            candidate(5353, 4, Protocol::Udp),
            candidate(5353, 4, Protocol::Udp),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].protocol, Protocol::Udp);
    }

    #[test]
    fn test_same_port_different_pid_kept_apart() {
        let merged = merge_protocols(vec![
            candidate(8080, 1, Protocol::Tcp),
            candidate(8080, 2, Protocol::Udp),
        ]);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|p| p.protocol != Protocol::Both));
    }

    #[test]
    fn test_pairs_unique_after_merge() {
        let mut input = Vec::new();
        for port in [22u16, 80, 443, 5353] {
            for pid in [1u32, 2] {
                input.push(candidate(port, pid, Protocol::Tcp));
                input.push(candidate(port, pid, Protocol::Udp));
            }
        }

        let merged = merge_protocols(input);
        let keys: HashSet<(u16, u32)> = merged.iter().map(|p| (p.port, p.pid)).collect();
        assert_eq!(keys.len(), merged.len());
        assert!(merged.iter().all(|p| p.protocol == Protocol::Both));
    }
}
