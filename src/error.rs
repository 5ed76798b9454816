//! Error types and Result aliases for shellmux

use std::fmt;
use std::path::PathBuf;

/// Result type alias for shellmux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shellmux
///
/// Construction-time failures (`SpawnFailed`, `NotAShell`) are the only
/// errors a session ever returns to callers. I/O failures during a running
/// batch are absorbed into the session status instead, so concurrent callers
/// observe a broken session through `is_alive()` rather than an exception
/// thrown mid-use.
#[derive(Debug)]
pub enum Error {
    // === Session errors ===
    /// The shell subprocess could not be started
    SpawnFailed {
        command: String,
        reason: String,
    },

    /// The spawned process failed the handshake; it is not a usable shell
    NotAShell {
        command: String,
    },

    /// A stdio channel of the child process was unavailable at spawn
    ChannelUnavailable {
        channel: &'static str,
    },

    // === Dispatch errors ===
    /// The worker executing a synchronous task disappeared before replying
    WorkerLost,

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to save configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration file not found
    ConfigNotFound,

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// TOML parsing errors
    Toml(toml::de::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors (for cases not yet categorized)
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Session errors
            Error::SpawnFailed { command, reason } => {
                write!(f, "Failed to spawn shell '{}': {}", command, reason)
            }
            Error::NotAShell { command } => {
                write!(f, "Process '{}' did not answer the shell handshake", command)
            }
            Error::ChannelUnavailable { channel } => {
                write!(f, "Child process {} channel unavailable", channel)
            }

            // Dispatch errors
            Error::WorkerLost => {
                write!(f, "Worker dropped its result channel before completing")
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }
            Error::ConfigNotFound => {
                write!(f, "Configuration file not found")
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Toml(err) => write!(f, "TOML parsing error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Toml(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Other(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Other(err.to_string())
    }
}
