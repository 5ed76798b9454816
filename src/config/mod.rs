//! Configuration management for shellmux
//!
//! Provides the serde-backed [`Config`] structure (shell spawn settings and
//! session behavior) plus TOML loading/saving with sensible fallbacks.

pub mod loader;

pub use loader::{ConfigLoader, LoadOptions};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::models::SpawnSpec;

/// Main configuration structure for shellmux
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shell spawn configuration
    #[serde(default)]
    pub shell: ShellConfig,

    /// Session behavior configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Which interpreter to launch and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Path to the command interpreter
    pub program: String,

    /// Arguments passed to the interpreter
    pub args: Vec<String>,

    /// Whether the child inherits the parent environment
    pub inherit_env: bool,

    /// Extra environment variables for the child
    pub env: HashMap<String, String>,

    /// Working directory for the child
    pub working_directory: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "/bin/sh".to_string(),
            args: Vec::new(),
            inherit_env: true,
            env: HashMap::new(),
            working_directory: None,
        }
    }
}

impl ShellConfig {
    /// Build the spawn specification this configuration describes
    pub fn to_spawn_spec(&self) -> SpawnSpec {
        SpawnSpec {
            program: self.program.clone(),
            args: self.args.clone(),
            env: self.env.clone(),
            inherit_env: self.inherit_env,
            working_directory: self.working_directory.clone(),
        }
    }
}

/// Session behavior knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Whether to run the privilege probe after the handshake
    pub probe_root: bool,

    /// Whether to log submitted command text at trace level
    ///
    /// Off by default: command lines routinely contain paths and arguments
    /// that do not belong in logs.
    pub log_commands: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            probe_root: true,
            log_commands: false,
        }
    }
}
