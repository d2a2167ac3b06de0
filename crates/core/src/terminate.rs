// iOS Tunnel Manager - Terminator
// Kills the detached tunnel by its recorded pid and clears the pid file

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use ios_tunnel_common::{Error, Result};

use crate::elevate::Elevator;
use crate::shell;

/// Outcome of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No pid file: nothing to stop. Treated as success.
    AlreadyStopped,
    /// Elevated termination was dispatched and the pid file removed.
    Requested,
}

/// Reads the recorded pid and requests elevated termination plus pid-file
/// cleanup. Callers treat every failure as loggable, never fatal.
pub struct Terminator {
    pid_path: PathBuf,
    elevator: Arc<dyn Elevator>,
}

impl Terminator {
    pub fn new(pid_path: impl Into<PathBuf>, elevator: Arc<dyn Elevator>) -> Self {
        Self {
            pid_path: pid_path.into(),
            elevator,
        }
    }

    /// Request termination of the recorded tunnel process.
    ///
    /// The kill and the pid-file removal run as one composite elevated
    /// command, so the user sees a single prompt. On a failed elevation the
    /// pid file is left in place for a later retry.
    pub async fn stop(&self) -> Result<StopOutcome> {
        if !self.pid_path.exists() {
            info!(
                "No pid file at {}; tunnel already stopped or never started",
                self.pid_path.display()
            );
            return Ok(StopOutcome::AlreadyStopped);
        }

        let pid = match self.read_pid() {
            Ok(pid) => pid,
            Err(e) => {
                warn!("Refusing to signal from corrupt pid state: {}", e);
                return Err(e);
            }
        };

        let shell_cmd = format!(
            "kill -TERM {}; rm -f {}",
            pid,
            shell::quote(&self.pid_path.to_string_lossy())
        );
        let rc = self.elevator.run_elevated(&shell_cmd).await?;
        if rc != 0 {
            warn!(
                "Elevated termination of pid {} failed with exit code {}; pid file retained",
                pid, rc
            );
            return Err(Error::ElevationFailed(rc));
        }

        info!("Requested termination of tunnel process {}", pid);
        Ok(StopOutcome::Requested)
    }

    /// Parse the pid file, accepting exactly one positive integer with
    /// optional surrounding whitespace.
    fn read_pid(&self) -> Result<u32> {
        let raw = std::fs::read_to_string(&self.pid_path)
            .map_err(|e| Error::CorruptPidState(format!("unreadable: {e}")))?;
        let trimmed = raw.trim();
        match trimmed.parse::<u32>() {
            Ok(pid) if pid > 0 => Ok(pid),
            _ => Err(Error::CorruptPidState(trimmed.to_string())),
        }
    }
}
