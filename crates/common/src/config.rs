// iOS Tunnel Manager - Configuration
// Tool command, log/pid locations, and polling parameters

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tunnel manager configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TunnelConfig {
    /// Argv of the external tunnel-start tool
    #[serde(default = "default_tool")]
    pub tool: Vec<String>,

    /// Combined stdout/stderr of the detached tool is appended here
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// The detached process id is recorded here for later termination
    #[serde(default = "default_pid_path")]
    pub pid_path: PathBuf,

    /// How long `start` waits for the endpoint announcement, in seconds
    #[serde(default = "default_start_timeout")]
    pub start_timeout_secs: u64,

    /// Interval between log polls, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_tool() -> Vec<String> {
    vec![
        "python3".to_string(),
        "-m".to_string(),
        "pymobiledevice3".to_string(),
        "lockdown".to_string(),
        "start-tunnel".to_string(),
    ]
}

fn default_log_path() -> PathBuf {
    std::env::temp_dir()
        .join("ios-tunnel-manager")
        .join("tunnel.log")
}

fn default_pid_path() -> PathBuf {
    std::env::temp_dir()
        .join("ios-tunnel-manager")
        .join("tunnel.pid")
}

fn default_start_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            log_path: default_log_path(),
            pid_path: default_pid_path(),
            start_timeout_secs: default_start_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl TunnelConfig {
    /// Load configuration from the user config file, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("ios-tunnel-manager").join("config.toml"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tool.is_empty() {
            return Err(Error::Config("Tool command cannot be empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TunnelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.start_timeout(), Duration::from_secs(30));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.tool[0], "python3");
    }

    #[test]
    fn empty_tool_command_rejected() {
        let config = TunnelConfig {
            tool: vec![],
            ..TunnelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let config = TunnelConfig {
            poll_interval_ms: 0,
            ..TunnelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: TunnelConfig = toml::from_str(
            r#"
            start_timeout_secs = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.start_timeout_secs, 90);
        assert_eq!(config.poll_interval_ms, 100);
        assert!(!config.tool.is_empty());
    }

    #[test]
    fn full_toml_overrides_apply() {
        let config: TunnelConfig = toml::from_str(
            r#"
            tool = ["pymobiledevice3", "lockdown", "start-tunnel"]
            log_path = "/var/log/tunnel.log"
            pid_path = "/var/run/tunnel.pid"
            start_timeout_secs = 10
            poll_interval_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.tool.len(), 3);
        assert_eq!(config.log_path, PathBuf::from("/var/log/tunnel.log"));
        assert_eq!(config.poll_interval(), Duration::from_millis(50));
    }
}
