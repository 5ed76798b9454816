//! # shellmux
//!
//! Drive a persistent command interpreter subprocess from Rust: spawn a
//! shell once, keep it warm, and feed it serialized batches of commands
//! while collecting stdout and stderr line by line.
//!
//! The interpreter's output streams carry no framing, so batch boundaries
//! are recovered with a sentinel protocol: every batch ends with an `echo`
//! of a session-unique random token to both streams, and the per-stream
//! gobblers treat that token line as the end-of-batch mark.
//!
//! ## Quick start
//!
//! ```no_run
//! use shellmux::{new_sink, sink_lines, ShellSession, SpawnSpec};
//!
//! # fn main() -> shellmux::Result<()> {
//! let session = ShellSession::open(SpawnSpec::default())?;
//! let output = new_sink();
//! session.run(&["echo hello", "uname -s"], Some(output.clone()), None);
//! for line in sink_lines(&output) {
//!     println!("{}", line);
//! }
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`shell`] - session lifecycle, output gobblers, batch dispatch
//! - [`execution`] - worker pool and coordinating-thread marshaling
//! - [`models`] - statuses, spawn descriptions, line sinks
//! - [`config`] - TOML configuration and its loader
//! - [`error`] - the crate-wide error type

#[macro_use]
extern crate tracing;

pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod shell;

pub use config::{Config, ConfigLoader, SessionConfig, ShellConfig};
pub use error::{Error, Result};
pub use execution::{workers, ContextDispatcher, ContextHandle};
pub use models::{new_sink, sink_lines, LineSink, ShellStatus, SpawnSpec};
pub use shell::{BatchCallback, GobblerState, ShellSession, StreamGobbler};

/// Loads configuration from the standard search paths.
pub fn init() -> Result<Config> {
    ConfigLoader::load()
}

/// Loads configuration from an explicit file.
pub fn init_with_config(path: &std::path::Path) -> Result<Config> {
    ConfigLoader::new().load_config_file(path)
}

/// Crate version, from the build manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
