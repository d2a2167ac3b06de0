// Common types for iOS Tunnel Manager

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remote-service-discovery endpoint announced by the tunnel tool
/// once the tunnel is established.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TunnelEndpoint {
    /// Tunnel-local address of the device
    pub address: String,
    /// RSD service port (1-65535)
    pub port: u16,
}

impl TunnelEndpoint {
    /// Build an endpoint from the raw tokens of an announcement line.
    ///
    /// Returns `None` when the port token is not a decimal number in
    /// 1-65535; such lines must be skipped, not reported.
    pub fn from_tokens(address: &str, port: &str) -> Option<Self> {
        let port: u16 = port.parse().ok()?;
        if port == 0 {
            return None;
        }
        Some(Self {
            address: address.to_string(),
            port,
        })
    }
}

impl std::fmt::Display for TunnelEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.address, self.port)
    }
}

/// Filesystem record of a spawned tunnel process.
///
/// The tunnel runs fully detached from this program, so the authoritative
/// pid lives in the pid file rather than in memory: the controlling program
/// may restart while the tunnel keeps running.
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    /// Pid observed at launch time, if any. Informational only; the
    /// terminator always re-reads the pid file.
    pub pid: Option<u32>,
    /// Combined stdout/stderr of the tunnel tool
    pub log_path: PathBuf,
    /// Decimal pid of the detached process, optional surrounding whitespace
    pub pid_path: PathBuf,
}

impl ProcessRecord {
    pub fn new(log_path: PathBuf, pid_path: PathBuf) -> Self {
        Self {
            pid: None,
            log_path,
            pid_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_valid_tokens() {
        let ep = TunnelEndpoint::from_tokens("fd7b:6f3c::1", "49152").unwrap();
        assert_eq!(ep.address, "fd7b:6f3c::1");
        assert_eq!(ep.port, 49152);
    }

    #[test]
    fn endpoint_rejects_port_zero() {
        assert!(TunnelEndpoint::from_tokens("10.0.0.5", "0").is_none());
    }

    #[test]
    fn endpoint_rejects_out_of_range_port() {
        assert!(TunnelEndpoint::from_tokens("10.0.0.5", "65536").is_none());
        assert!(TunnelEndpoint::from_tokens("10.0.0.5", "not-a-port").is_none());
    }

    #[test]
    fn endpoint_display_is_address_then_port() {
        let ep = TunnelEndpoint::from_tokens("10.0.0.5", "49152").unwrap();
        assert_eq!(ep.to_string(), "10.0.0.5 49152");
    }
}
