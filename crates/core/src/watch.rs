// iOS Tunnel Manager - Log Watcher
// Tails the tunnel tool's log until it announces the RSD endpoint

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::info;

use ios_tunnel_common::{Error, Result, TunnelEndpoint};

use crate::poll;

/// Announcement line printed by the tunnel tool, e.g.
/// `... --rsd fd7b:6f3c::1 49152 ...`
static RSD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--rsd (\S+) (\d+)").expect("static regex is valid"));

/// Receives every complete log line the watcher reads, before any match is
/// attempted. Observability only, non-authoritative.
pub trait LogSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Forwards tunnel tool output to tracing at info level.
#[derive(Debug, Clone, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn line(&self, line: &str) {
        info!(target: "tunnel", "{}", line);
    }
}

/// Polls for the tunnel log and scans new lines for the endpoint
/// announcement, bounded by a deadline.
pub struct LogWatcher {
    log_path: PathBuf,
    poll_interval: Duration,
    sink: Arc<dyn LogSink>,
}

impl LogWatcher {
    pub fn new(log_path: impl Into<PathBuf>, poll_interval: Duration) -> Self {
        Self::with_sink(log_path, poll_interval, Arc::new(TracingLogSink))
    }

    pub fn with_sink(
        log_path: impl Into<PathBuf>,
        poll_interval: Duration,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            log_path: log_path.into(),
            poll_interval,
            sink,
        }
    }

    /// Wait for the endpoint announcement until `deadline`.
    ///
    /// Fails with `LogNotFound` if the log file never appears, and with
    /// `EndpointTimeout` if it appears but never announces an endpoint.
    pub async fn wait_for_endpoint(&self, deadline: Instant) -> Result<TunnelEndpoint> {
        let appeared = poll::poll_until(deadline, self.poll_interval, || {
            self.log_path.exists().then_some(())
        })
        .await;
        if appeared.is_none() {
            return Err(Error::LogNotFound);
        }

        let file = fs::File::open(&self.log_path)?;
        let mut reader = BufReader::new(file);
        let mut pending: Vec<u8> = Vec::new();

        let matched = poll::poll_until(deadline, self.poll_interval, || {
            drain_lines(&mut reader, &mut pending, self.sink.as_ref())
        })
        .await;

        match matched {
            Some(Ok(endpoint)) => Ok(endpoint),
            Some(Err(e)) => Err(e.into()),
            None => Err(Error::EndpointTimeout),
        }
    }
}

/// Scan every complete line currently available in the log.
///
/// Returns `None` when the reader is drained with no match; the caller
/// sleeps and retries. A line is only processed once newline-terminated,
/// so a partially flushed announcement can never match on a truncated
/// port. The first match wins.
fn drain_lines(
    reader: &mut impl BufRead,
    pending: &mut Vec<u8>,
    sink: &dyn LogSink,
) -> Option<io::Result<TunnelEndpoint>> {
    loop {
        match reader.read_until(b'\n', pending) {
            Ok(0) => return None,
            Ok(_) => {
                if pending.last() != Some(&b'\n') {
                    return None;
                }
                {
                    let text = String::from_utf8_lossy(pending);
                    let line = text.trim();
                    if !line.is_empty() {
                        // Forwarded before matching is attempted.
                        sink.line(line);
                        if let Some(endpoint) = match_announcement(line) {
                            return Some(Ok(endpoint));
                        }
                    }
                }
                pending.clear();
            }
            Err(e) => return Some(Err(e)),
        }
    }
}

/// Extract the endpoint from an announcement line, if present and
/// well-formed (port in 1-65535).
fn match_announcement(line: &str) -> Option<TunnelEndpoint> {
    let caps = RSD_PATTERN.captures(line)?;
    TunnelEndpoint::from_tokens(&caps[1], &caps[2])
}
