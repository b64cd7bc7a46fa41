// file: src/error.rs
// version: 2.2.0
// guid: 57b83a63-07b6-4534-aa6c-51e8797254e0

use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, SaltError>;

/// Error types for grains, nodegroup and minion ID handling
#[derive(Error, Debug)]
pub enum SaltError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse line in grains file: '{line}'")]
    Parse { line: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The agent exited non-zero.
    ///
    /// `output` is the agent's stdout followed by its stderr. The two streams
    /// are captured separately, so lines are not interleaved in write order.
    #[error("failed to set grains: {output}, error: {status}, when running: {command}")]
    AgentFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("failed to start salt agent: {source}, when running: {command}")]
    AgentSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timeout: {command} did not finish within {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SaltError {
    /// Create a new grains parse error for the offending line
    pub fn parse(line: impl Into<String>) -> Self {
        Self::Parse { line: line.into() }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true when the error is an I/O "not found" failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
