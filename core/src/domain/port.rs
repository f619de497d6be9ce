//! Port and process domain models.

use serde::{Deserialize, Serialize};

// ============================================================================
// Protocol
// ============================================================================

/// Transport protocol of a listening socket.
///
/// `Both` only appears after TCP and UDP candidates for the same
/// `(port, pid)` have been merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Both,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Both => "BOTH",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PortClass
// ============================================================================

/// IANA range a port number falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortClass {
    /// Well-known ports (below 1024).
    System,
    /// Registered ports (1024 to 9999).
    Registered,
    /// Everything from 10000 up.
    Dynamic,
}

impl PortClass {
    pub fn of(port: u16) -> Self {
        match port {
            0..=1023 => PortClass::System,
            1024..=9999 => PortClass::Registered,
            _ => PortClass::Dynamic,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PortClass::System => "system",
            PortClass::Registered => "registered",
            PortClass::Dynamic => "dynamic",
        }
    }
}

/// Whether a process name belongs to one of the given interpreter families.
///
/// Matching is a case-insensitive substring test, so `python3.12` and
/// `Python` both count as `python`.
pub fn is_interpreter<S: AsRef<str>>(process_name: &str, interpreters: &[S]) -> bool {
    let name = process_name.to_lowercase();
    interpreters
        .iter()
        .any(|i| name.contains(&i.as_ref().to_lowercase()))
}

/// Undo lsof's escaping of spaces in command names (`Code\x20Helper`).
pub fn normalize_process_name(raw: &str) -> String {
    raw.replace("\\x20", " ")
}

// ============================================================================
// PortProcess
// ============================================================================

/// One observed (process, port) binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortProcess {
    /// Process ID of the owning process.
    pub pid: u32,
    /// The port number (e.g., 3000, 8080).
    pub port: u16,
    pub protocol: Protocol,
    /// Connection state as reported by the platform ("LISTEN", "OPEN", ...).
    pub state: String,
    /// Bound local address. Wildcard binds are rendered as `0.0.0.0`.
    pub address: String,
    /// Display name of the process.
    pub process_name: String,
    /// Full command line, or the process name when unavailable.
    pub command: String,
    /// Owning account, when the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Working directory, probed for interpreter processes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl PortProcess {
    /// Create a candidate with no user or working directory.
    pub fn new(
        pid: u32,
        port: u16,
        protocol: Protocol,
        state: impl Into<String>,
        address: impl Into<String>,
        process_name: impl Into<String>,
    ) -> Self {
        let process_name = process_name.into();
        Self {
            pid,
            port,
            protocol,
            state: state.into(),
            address: address.into(),
            command: process_name.clone(),
            process_name,
            user: None,
            cwd: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        let command = command.into();
        if !command.is_empty() {
            self.command = command;
        }
        self
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user.filter(|u| !u.is_empty());
        self
    }

    pub fn with_cwd(mut self, cwd: Option<String>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn port_class(&self) -> PortClass {
        PortClass::of(self.port)
    }

    /// Text for the command column: the project directory for interpreters,
    /// otherwise the command line.
    ///
    /// A `cwd` under `home` is shortened to start with `~`.
    pub fn display_command(&self, home: Option<&str>) -> String {
        if let Some(cwd) = &self.cwd {
            return match home {
                Some(home) if !home.is_empty() && cwd.starts_with(home) => {
                    format!("~{}", &cwd[home.len()..])
                }
                _ => cwd.clone(),
            };
        }
        if self.command.is_empty() {
            self.process_name.clone()
        } else {
            self.command.clone()
        }
    }
}

impl std::fmt::Display for PortProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} {} (PID: {}, Process: {})",
            self.address, self.port, self.protocol, self.pid, self.process_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_class() {
        assert_eq!(PortClass::of(22), PortClass::System);
        assert_eq!(PortClass::of(1023), PortClass::System);
        assert_eq!(PortClass::of(1024), PortClass::Registered);
        assert_eq!(PortClass::of(8080), PortClass::Registered);
        assert_eq!(PortClass::of(10000), PortClass::Dynamic);
        assert_eq!(PortClass::of(65535), PortClass::Dynamic);
    }

    #[test]
    fn test_is_interpreter() {
        let interpreters = ["node", "python", "ruby"];
        assert!(is_interpreter("node", &interpreters));
        assert!(is_interpreter("Python3.12", &interpreters));
        assert!(!is_interpreter("nginx", &interpreters));
        assert!(!is_interpreter("redis-server", &interpreters));
    }

    #[test]
    fn test_normalize_process_name() {
        assert_eq!(normalize_process_name("Code\\x20Helper"), "Code Helper");
        assert_eq!(normalize_process_name("nginx"), "nginx");
    }

    #[test]
    fn test_command_falls_back_to_name() {
        let p = PortProcess::new(1, 80, Protocol::Tcp, "LISTEN", "0.0.0.0", "nginx")
            .with_command("");
        assert_eq!(p.command, "nginx");

        let p = p.with_command("nginx: master process");
        assert_eq!(p.command, "nginx: master process");
    }

    #[test]
    fn test_display_command() {
        let p = PortProcess::new(7, 3000, Protocol::Tcp, "LISTEN", "127.0.0.1", "node")
            .with_command("node server.js");
        assert_eq!(p.display_command(Some("/home/dev")), "node server.js");

        let p = p.with_cwd(Some("/home/dev/app".to_string()));
        assert_eq!(p.display_command(Some("/home/dev")), "~/app");
        assert_eq!(p.display_command(None), "/home/dev/app");
    }

    #[test]
    fn test_serialize_protocol() {
        let p = PortProcess::new(1, 53, Protocol::Both, "LISTEN", "0.0.0.0", "dnsmasq");
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(r#""protocol":"BOTH""#));
        assert!(json.contains(r#""processName":"dnsmasq""#));
        assert!(!json.contains("cwd"));
    }
}
