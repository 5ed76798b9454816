//! Persistent interpreter sessions
//!
//! This module drives one long-lived command interpreter per session:
//! spawning and handshaking ([`session`]), sentinel-framed output collection
//! ([`gobbler`]) and serialized batch dispatch ([`dispatch`]).

pub mod dispatch;
pub mod gobbler;
pub mod session;

pub use dispatch::BatchCallback;
pub use gobbler::{GobblerState, StreamGobbler};
pub use session::ShellSession;
