//! Port scanner adapters.
//!
//! Platform-specific implementations of port scanning. The platform is
//! detected once when the scanner is built; every scan afterwards goes to the
//! same variant.

mod ss;
mod unix;
mod utils;
mod windows;

pub use unix::UnixScanner;
pub use windows::WindowsScanner;

use crate::adapters::SystemCommandRunner;
use crate::config::Settings;
use crate::domain::PortProcess;
use crate::ports::{CommandRunner, PortScannerPort};

/// Detail text shown when the detail command produced nothing.
pub const PROCESS_NOT_FOUND: &str = "Process not found";

/// Detail text on platforms without a scanner.
pub const UNSUPPORTED_PLATFORM: &str = "Unsupported platform";

/// Operating system family, as far as scanning is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Unix,
    Windows,
    Unsupported,
}

impl Platform {
    /// Platform of the running process.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map an OS identifier (as in `std::env::consts::OS`) to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" | "macos" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Unix,
            "windows" => Platform::Windows,
            _ => Platform::Unsupported,
        }
    }
}

/// The main port scanner, one variant per platform family.
pub enum PortScanner<R: CommandRunner = SystemCommandRunner> {
    Unix(UnixScanner<R>),
    Windows(WindowsScanner<R>),
    Unsupported,
}

impl PortScanner {
    /// Create a new port scanner for the current platform.
    pub fn new(settings: &Settings) -> Self {
        Self::for_platform(Platform::detect(), SystemCommandRunner::new(), settings)
    }
}

impl<R: CommandRunner> PortScanner<R> {
    /// Create a scanner for an explicit platform and runner.
    pub fn for_platform(platform: Platform, runner: R, settings: &Settings) -> Self {
        match platform {
            Platform::Unix => PortScanner::Unix(UnixScanner::new(
                runner,
                settings.interpreters.clone(),
                cfg!(target_os = "linux"),
            )),
            Platform::Windows => PortScanner::Windows(WindowsScanner::new(runner)),
            Platform::Unsupported => PortScanner::Unsupported,
        }
    }

    pub fn platform(&self) -> Platform {
        match self {
            PortScanner::Unix(_) => Platform::Unix,
            PortScanner::Windows(_) => Platform::Windows,
            PortScanner::Unsupported => Platform::Unsupported,
        }
    }
}

impl<R: CommandRunner> PortScannerPort for PortScanner<R> {
    async fn scan(&self) -> Vec<PortProcess> {
        match self {
            PortScanner::Unix(inner) => inner.scan().await,
            PortScanner::Windows(inner) => inner.scan().await,
            PortScanner::Unsupported => Vec::new(),
        }
    }

    async fn describe(&self, pid: u32) -> String {
        let details = match self {
            PortScanner::Unix(inner) => inner.describe(pid).await,
            PortScanner::Windows(inner) => inner.describe(pid).await,
            PortScanner::Unsupported => return UNSUPPORTED_PLATFORM.to_string(),
        };

        if details.is_empty() {
            PROCESS_NOT_FOUND.to_string()
        } else {
            details
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use crate::ports::CommandRunner;

    /// Runner answering from canned output keyed by the full command line.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, command_line: &str, output: &str) -> Self {
            self.responses
                .insert(command_line.to_string(), output.trim().to_string());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        pub fn count(&self, command_line: &str) -> usize {
            self.calls.lock().iter().filter(|c| *c == command_line).count()
        }
    }

    impl CommandRunner for FakeRunner {
        async fn run(&self, program: &str, args: &[&str]) -> String {
            let mut line = program.to_string();
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            self.calls.lock().push(line.clone());
            self.responses.get(&line).cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeRunner;
    use super::*;

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("linux"), Platform::Unix);
        assert_eq!(Platform::from_os("macos"), Platform::Unix);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("haiku"), Platform::Unsupported);
    }

    #[tokio::test]
    async fn test_unsupported_platform_is_empty() {
        let scanner =
            PortScanner::for_platform(Platform::Unsupported, FakeRunner::new(), &Settings::default());
        assert_eq!(scanner.platform(), Platform::Unsupported);
        assert!(scanner.scan().await.is_empty());
        assert_eq!(scanner.describe(1).await, UNSUPPORTED_PLATFORM);
    }

    #[tokio::test]
    async fn test_describe_falls_back_to_not_found() {
        let scanner =
            PortScanner::for_platform(Platform::Windows, FakeRunner::new(), &Settings::default());
        assert_eq!(scanner.describe(4242).await, PROCESS_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_describe_passes_output_through() {
        let runner = FakeRunner::new().respond(
            "ps -p 42 -o pid,ppid,user,%cpu,%mem,etime,command",
            "  PID  PPID USER  %CPU %MEM ELAPSED COMMAND\n   42     1 dev    0.0  0.1   01:02 node app.js",
        );
        let scanner = PortScanner::for_platform(Platform::Unix, runner, &Settings::default());
        let details = scanner.describe(42).await;
        assert!(details.contains("node app.js"));
        assert_eq!(details.lines().count(), 2);
    }
}
