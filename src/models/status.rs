//! Shell Status Model
//!
//! Ordered lifecycle state of a shell session. The ordering matters:
//! everything at or below `Unknown` counts as not-live, and `Closed` is
//! terminal.

use serde::{Deserialize, Serialize};

/// Represents the privilege/liveness state of a shell session
///
/// Variants are declared in ascending order so comparisons work directly:
/// `Closed < Unknown < NonRoot < Root`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShellStatus {
    /// Session has been closed; terminal state
    Closed,
    /// A command write failed mid-batch; the session is presumed broken
    Unknown,
    /// Handshake succeeded; the shell runs without root privileges
    NonRoot,
    /// The privilege probe reported uid 0
    Root,
}

impl ShellStatus {
    /// Whether the session is in a usable state
    pub fn is_live(self) -> bool {
        self > ShellStatus::Unknown
    }

    /// Whether the shell holds root privileges
    pub fn is_root(self) -> bool {
        matches!(self, ShellStatus::Root)
    }
}

impl std::fmt::Display for ShellStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ShellStatus::Closed => "closed",
            ShellStatus::Unknown => "unknown",
            ShellStatus::NonRoot => "non-root",
            ShellStatus::Root => "root",
        };
        write!(f, "{}", name)
    }
}
