//! Process termination.
//!
//! Unix sends SIGTERM (or SIGKILL when forced) directly through `nix`.
//! Windows shells out to `taskkill`, adding `/F` when forced.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ports::ProcessKillerPort;

/// Kills processes on the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessKiller;

impl ProcessKiller {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessKillerPort for ProcessKiller {
    async fn kill(&self, pid: u32, force: bool) -> Result<()> {
        debug!(pid, force, "sending termination request");
        let result = terminate(pid, force).await;
        if let Err(err) = &result {
            warn!(pid, force, error = %err, "termination failed");
        }
        result
    }
}

#[cfg(unix)]
async fn terminate(pid: u32, force: bool) -> Result<()> {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    // 0 and negative values address process groups.
    let raw = match i32::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => {
            return Err(Error::KillFailed {
                pid,
                reason: "Invalid process id".to_string(),
            })
        }
    };

    let sig = if force { Signal::SIGKILL } else { Signal::SIGTERM };
    signal::kill(Pid::from_raw(raw), sig).map_err(|errno| Error::KillFailed {
        pid,
        reason: errno.desc().to_string(),
    })
}

#[cfg(windows)]
async fn terminate(pid: u32, force: bool) -> Result<()> {
    use std::process::Stdio;
    use tokio::process::Command;

    let pid_arg = pid.to_string();
    let mut args = vec!["/PID", pid_arg.as_str()];
    if force {
        args.push("/F");
    }

    let output = Command::new("taskkill")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::KillFailed {
            pid,
            reason: e.to_string(),
        })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let reason = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    Err(Error::KillFailed { pid, reason })
}

#[cfg(not(any(unix, windows)))]
async fn terminate(pid: u32, _force: bool) -> Result<()> {
    Err(Error::KillFailed {
        pid,
        reason: "Unsupported platform".to_string(),
    })
}
