//! Data structures shared across the crate
//!
//! - [`ShellStatus`] - ordered session lifecycle state
//! - [`SpawnSpec`] - process spawn specification
//! - [`LineSink`] - shared, append-only sink for captured output lines

pub mod spawn_spec;
pub mod status;

pub use spawn_spec::SpawnSpec;
pub use status::ShellStatus;

use std::sync::{Arc, Mutex};

/// Ordered, caller-owned, append-only sink for captured output lines
///
/// Sinks are shared between the caller and the gobbler thread that fills
/// them, and may be handed to async result callbacks on yet another thread,
/// so they are synchronized from the start.
pub type LineSink = Arc<Mutex<Vec<String>>>;

/// Create an empty [`LineSink`]
pub fn new_sink() -> LineSink {
    Arc::new(Mutex::new(Vec::new()))
}

/// Copy the current contents of a sink
///
/// Returns an empty vector if the sink mutex was poisoned by a panicking
/// writer; captured output is best-effort at that point.
pub fn sink_lines(sink: &LineSink) -> Vec<String> {
    match sink.lock() {
        Ok(lines) => lines.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
