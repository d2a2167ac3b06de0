// iOS Tunnel Manager - Privileged Process Launcher
// Dispatches the tunnel tool detached under elevation and waits for its
// endpoint announcement

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use ios_tunnel_common::{Error, ProcessRecord, Result, TunnelConfig, TunnelEndpoint};

use crate::elevate::Elevator;
use crate::handle::TunnelHandle;
use crate::shell;
use crate::watch::{LogSink, LogWatcher, TracingLogSink};

/// Builds and dispatches the elevated, detached tunnel command, then waits
/// for the endpoint announcement in its log.
pub struct Launcher {
    config: TunnelConfig,
    elevator: Arc<dyn Elevator>,
    log_sink: Arc<dyn LogSink>,
}

impl Launcher {
    pub fn new(config: TunnelConfig, elevator: Arc<dyn Elevator>) -> Self {
        Self {
            config,
            elevator,
            log_sink: Arc::new(TracingLogSink),
        }
    }

    /// Replace the sink that receives the tunnel tool's log lines.
    pub fn with_log_sink(mut self, log_sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    /// Start the tunnel and wait up to `timeout` for its endpoint.
    ///
    /// A non-zero result from the elevation request is a hard failure with
    /// no waiting. Elevation may still succeed while the inner detached
    /// command fails later; that surfaces only through the log, as
    /// `LogNotFound` or `EndpointTimeout`.
    pub async fn start(&self, timeout: Duration) -> Result<(TunnelHandle, TunnelEndpoint)> {
        self.remove_stale_log()?;
        self.ensure_parent_dirs()?;

        let shell_cmd = self.build_command();
        debug!("Launching tunnel: {}", shell_cmd);

        let rc = self.elevator.run_elevated(&shell_cmd).await?;
        if rc != 0 {
            return Err(Error::ElevationFailed(rc));
        }

        // The deadline starts after the interactive prompt returns, so time
        // spent typing a password does not eat into the watch window.
        let deadline = Instant::now() + timeout;
        let watcher = LogWatcher::with_sink(
            &self.config.log_path,
            self.config.poll_interval(),
            self.log_sink.clone(),
        );
        let endpoint = watcher.wait_for_endpoint(deadline).await?;

        let mut record = ProcessRecord::new(
            self.config.log_path.clone(),
            self.config.pid_path.clone(),
        );
        record.pid = self.recorded_pid();

        info!(
            "Tunnel established at {} (pid {:?})",
            endpoint, record.pid
        );
        Ok((
            TunnelHandle::new(record, self.elevator.clone()),
            endpoint,
        ))
    }

    /// Wrap the tool argv so it appends combined output to the log, runs
    /// detached in the background, and records its pid. Every argument is
    /// individually quoted; path content cannot inject into the shell.
    fn build_command(&self) -> String {
        format!(
            "{} >> {} 2>&1 & echo $! > {}",
            shell::join(&self.config.tool),
            shell::quote(&self.config.log_path.to_string_lossy()),
            shell::quote(&self.config.pid_path.to_string_lossy()),
        )
    }

    /// A leftover log from an earlier run must never satisfy the watcher.
    fn remove_stale_log(&self) -> Result<()> {
        match std::fs::remove_file(&self.config.log_path) {
            Ok(()) => {
                debug!("Removed stale log {}", self.config.log_path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn ensure_parent_dirs(&self) -> Result<()> {
        for path in [&self.config.log_path, &self.config.pid_path] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Best-effort read of the pid the wrapper recorded; informational only.
    /// The terminator re-reads the pid file when stopping.
    fn recorded_pid(&self) -> Option<u32> {
        let raw = std::fs::read_to_string(&self.config.pid_path).ok()?;
        raw.trim().parse::<u32>().ok().filter(|pid| *pid > 0)
    }
}
