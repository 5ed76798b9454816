//! Spawn Specification Model
//!
//! Describes how to launch the command-interpreter subprocess. Built by a
//! collaborator (or from configuration) and consumed as-is by
//! `ShellSession::open`; the session never second-guesses the command line.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Specification for spawning a shell subprocess
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSpec {
    /// Program to launch (e.g. `/bin/sh`)
    pub program: String,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Extra environment variables for the child
    pub env: HashMap<String, String>,

    /// Whether the child inherits the parent environment
    pub inherit_env: bool,

    /// Working directory for the child (parent's if absent)
    pub working_directory: Option<PathBuf>,
}

impl SpawnSpec {
    /// Create a spec for the given program with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            inherit_env: true,
            working_directory: None,
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the child
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Build the `std::process::Command` this spec describes
    ///
    /// All three stdio channels are piped; the session owns them exclusively.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if !self.inherit_env {
            cmd.env_clear();
        }
        cmd.envs(&self.env);
        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Display form of the command line, for diagnostics
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Default for SpawnSpec {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

impl std::fmt::Display for SpawnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command_line())
    }
}
