// Error types for iOS Tunnel Manager

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Privilege elevation failed with exit code {0}")]
    ElevationFailed(i32),

    #[error("Tunnel log file never appeared; the elevated launch likely failed before its first write")]
    LogNotFound,

    #[error("Tunnel tool produced no endpoint announcement before the deadline")]
    EndpointTimeout,

    #[error("Pid file does not contain a valid process id: {0:?}")]
    CorruptPidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
