//! Command runner backed by `tokio::process`.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::ports::CommandRunner;

/// Runs commands directly (no shell) with all stdio captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> String {
        let output = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!(program, error = %e, "Failed to spawn command");
                return String::new();
            }
        };

        if !output.status.success() {
            debug!(program, ?args, status = ?output.status, "Command exited unsuccessfully");
            return String::new();
        }

        match String::from_utf8(output.stdout) {
            Ok(stdout) => stdout.trim().to_string(),
            Err(_) => {
                debug!(program, "Command produced invalid UTF-8");
                String::new()
            }
        }
    }
}
