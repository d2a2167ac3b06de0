// iOS Tunnel Manager - Privilege Elevation Boundary
// One interactive prompt per call; the exit code reflects only whether
// elevation and dispatch succeeded, never the inner command's outcome.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::shell;

/// Runs a caller-supplied shell command string with elevated rights.
#[async_trait]
pub trait Elevator: Send + Sync {
    async fn run_elevated(&self, shell_cmd: &str) -> io::Result<i32>;
}

/// macOS elevation via the interactive `osascript` administrator prompt.
#[derive(Debug, Default)]
pub struct OsascriptElevator;

#[async_trait]
impl Elevator for OsascriptElevator {
    async fn run_elevated(&self, shell_cmd: &str) -> io::Result<i32> {
        let inner = format!("bash -lc {}", shell::quote(shell_cmd));
        let script = format!(
            "do shell script \"{}\" with administrator privileges",
            applescript_escape(&inner)
        );
        debug!("osascript: {}", script);

        let status = Command::new("/usr/bin/osascript")
            .arg("-e")
            .arg(script)
            .status()
            .await?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// Elevation via polkit's `pkexec` on non-macOS Unix systems.
#[derive(Debug, Default)]
pub struct PkexecElevator;

#[async_trait]
impl Elevator for PkexecElevator {
    async fn run_elevated(&self, shell_cmd: &str) -> io::Result<i32> {
        debug!("pkexec: {}", shell_cmd);

        let status = Command::new("pkexec")
            .arg("sh")
            .arg("-c")
            .arg(shell_cmd)
            .status()
            .await?;
        Ok(status.code().unwrap_or(-1))
    }
}

/// The platform's interactive elevation mechanism.
pub fn default_elevator() -> Arc<dyn Elevator> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(OsascriptElevator)
    }

    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(PkexecElevator)
    }
}

/// Escape a string for embedding in an AppleScript double-quoted literal.
fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applescript_escape_handles_quotes_and_backslashes() {
        assert_eq!(applescript_escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(applescript_escape(r"a\b"), r"a\\b");
    }

    #[tokio::test]
    async fn scripted_elevator_records_commands() {
        let elevator = testing::ScriptedElevator::new(0);
        let rc = elevator.run_elevated("echo hello").await.unwrap();
        assert_eq!(rc, 0);
        assert_eq!(elevator.commands(), vec!["echo hello"]);
    }
}
