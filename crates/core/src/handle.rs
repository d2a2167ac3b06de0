// iOS Tunnel Manager - Tunnel Handle

use std::sync::Arc;

use tracing::warn;

use ios_tunnel_common::ProcessRecord;

use crate::elevate::Elevator;
use crate::terminate::Terminator;

/// Lifecycle handle for a started tunnel.
///
/// The alive flag is purely local: it records that termination was
/// requested, never confirmed OS-level death, and is never re-validated
/// against the OS. Transitions one way, Alive to Terminated, only through
/// `terminate()`.
pub struct TunnelHandle {
    record: ProcessRecord,
    elevator: Arc<dyn Elevator>,
    alive: bool,
}

impl std::fmt::Debug for TunnelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelHandle")
            .field("record", &self.record)
            .field("alive", &self.alive)
            .finish_non_exhaustive()
    }
}

impl TunnelHandle {
    pub(crate) fn new(record: ProcessRecord, elevator: Arc<dyn Elevator>) -> Self {
        Self {
            record,
            elevator,
            alive: true,
        }
    }

    pub fn record(&self) -> &ProcessRecord {
        &self.record
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Request termination of the tunnel and mark the handle Terminated.
    ///
    /// Best-effort: a failed stop is logged and the handle still flips to
    /// Terminated, so shutdown of the host application is never blocked.
    pub async fn terminate(&mut self) {
        let terminator = Terminator::new(self.record.pid_path.clone(), self.elevator.clone());
        if let Err(e) = terminator.stop().await {
            warn!("Tunnel stop failed: {}", e);
        }
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elevate::testing::ScriptedElevator;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn record(dir: &TempDir) -> ProcessRecord {
        ProcessRecord::new(
            dir.path().join("tunnel.log"),
            dir.path().join("tunnel.pid"),
        )
    }

    #[tokio::test]
    async fn handle_starts_alive() {
        let dir = TempDir::new().unwrap();
        let handle = TunnelHandle::new(record(&dir), Arc::new(ScriptedElevator::new(0)));
        assert!(handle.is_alive());
    }

    #[tokio::test]
    async fn terminate_flips_flag_even_when_stop_fails() {
        let dir = TempDir::new().unwrap();
        let pid_path = dir.path().join("tunnel.pid");
        fs::write(&pid_path, "4242").unwrap();

        // Elevation failure: stop errors, but the flag still flips.
        let mut handle = TunnelHandle::new(record(&dir), Arc::new(ScriptedElevator::new(1)));
        handle.terminate().await;
        assert!(!handle.is_alive());
        assert!(pid_path.exists());
    }

    #[tokio::test]
    async fn terminate_with_no_pid_file_succeeds_quietly() {
        let dir = TempDir::new().unwrap();
        let elevator = Arc::new(ScriptedElevator::new(0));
        let mut handle = TunnelHandle::new(record(&dir), elevator.clone());

        handle.terminate().await;
        assert!(!handle.is_alive());
        assert_eq!(elevator.call_count(), 0);
    }

    #[tokio::test]
    async fn record_paths_are_preserved() {
        let dir = TempDir::new().unwrap();
        let handle = TunnelHandle::new(record(&dir), Arc::new(ScriptedElevator::new(0)));
        assert_eq!(
            handle.record().pid_path,
            PathBuf::from(dir.path().join("tunnel.pid"))
        );
    }
}
