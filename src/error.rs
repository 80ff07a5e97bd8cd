//! Error types for the esoplay supervisor

use thiserror::Error;

/// Main error type for esoplay
#[derive(Error, Debug)]
pub enum EsoplayError {
    /// The duplex channel could not be created
    #[error("Channel error: {0}")]
    Channel(String),

    /// The bridge process could not be spawned
    #[error("Failed to spawn bridge: {0}")]
    Spawn(String),

    /// The bridge ran but could not launch the interpreter
    #[error("Interpreter launch failed: {interpreter} (bridge exit code {code})")]
    LaunchFailed {
        /// Interpreter that was requested
        interpreter: String,
        /// Exit code reported by the bridge
        code: i32,
    },

    /// Writing to the interpreter's input failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for esoplay operations
pub type Result<T> = std::result::Result<T, EsoplayError>;

impl EsoplayError {
    /// Create a channel error
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a spawn error
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Create a launch failure error
    pub fn launch_failed(interpreter: impl Into<String>, code: i32) -> Self {
        Self::LaunchFailed {
            interpreter: interpreter.into(),
            code,
        }
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether this error means the interpreter side stopped reading
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == std::io::ErrorKind::BrokenPipe,
            _ => false,
        }
    }
}
