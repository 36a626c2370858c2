// src/probe/error.rs
use std::time::Duration;
use thiserror::Error;

/// Why a probe judged its service unhealthy. The `Display` text is what ends
/// up in the `error` field of an unhealthy result.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid SMTP response: {0}")]
    UnexpectedGreeting(String),

    /// Connect, authentication or query failure reported by the SQL driver.
    /// The driver's message is passed through unchanged.
    #[error("{0}")]
    Database(String),
}

impl ProbeError {
    pub fn connection_closed() -> Self {
        ProbeError::Connection("connection closed by server".to_string())
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => ProbeError::connection_closed(),
            _ => ProbeError::Connection(err.to_string()),
        }
    }
}
