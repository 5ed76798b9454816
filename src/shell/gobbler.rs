//! Output stream collection
//!
//! A [`StreamGobbler`] owns one reader thread for a single shell output
//! stream (stdout or stderr). The interpreter never frames its output, so
//! batch boundaries are recovered by watching for a session-unique sentinel
//! token that the dispatcher appends after every batch. The sentinel line
//! itself is swallowed; everything before it is delivered to the sink
//! registered for the current batch.

use std::io::{BufRead, ErrorKind};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use crate::models::LineSink;

/// Lifecycle of a gobbler between batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GobblerState {
    /// No batch in flight; the reader is parked.
    Idle,
    /// A batch is in flight; lines go to the registered sink.
    Collecting,
    /// The sentinel for the current batch was seen and swallowed.
    Done,
    /// The stream reached EOF, failed, or the session was closed. Terminal.
    Terminated,
}

struct Inner {
    state: GobblerState,
    sink: Option<LineSink>,
}

struct Shared {
    inner: Mutex<Inner>,
    cond: Condvar,
    token: String,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Sentinel-delimited line collector for one output stream.
pub struct StreamGobbler {
    shared: Arc<Shared>,
}

impl StreamGobbler {
    /// Spawns the reader thread over `source` and returns the control handle.
    ///
    /// `token` is the sentinel that marks the end of every batch on this
    /// stream; `label` names the thread for diagnostics.
    pub fn spawn<R>(source: R, token: String, label: &'static str) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: GobblerState::Idle,
                sink: None,
            }),
            cond: Condvar::new(),
            token,
        });
        let reader_shared = Arc::clone(&shared);
        thread::spawn(move || {
            debug!("gobbler thread started for {}", label);
            read_loop(source, &reader_shared);
            debug!("gobbler thread for {} terminated", label);
        });
        StreamGobbler { shared }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GobblerState {
        self.shared.lock().state
    }

    /// Starts a new batch: lines read from here on are appended to `sink`
    /// (or discarded when `None`) until the sentinel arrives.
    ///
    /// Ignored once the gobbler is terminated.
    pub fn begin(&self, sink: Option<LineSink>) {
        let mut inner = self.shared.lock();
        if inner.state == GobblerState::Terminated {
            return;
        }
        inner.state = GobblerState::Collecting;
        inner.sink = sink;
        self.shared.cond.notify_all();
    }

    /// Blocks until the current batch completes or the stream terminates.
    pub fn wait_done(&self) {
        let mut inner = self.shared.lock();
        while inner.state == GobblerState::Collecting {
            inner = self
                .shared
                .cond
                .wait(inner)
                .unwrap_or_else(|e| e.into_inner());
        }
        inner.sink = None;
    }

    /// Marks the stream terminated and wakes all waiters. Idempotent.
    pub fn terminate(&self) {
        let mut inner = self.shared.lock();
        inner.state = GobblerState::Terminated;
        inner.sink = None;
        self.shared.cond.notify_all();
    }
}

fn read_loop<R: BufRead>(mut source: R, shared: &Shared) {
    let mut line = String::new();
    loop {
        // Park between batches so no bytes are consumed before the
        // dispatcher registers a sink for them.
        {
            let mut inner = shared.lock();
            loop {
                match inner.state {
                    GobblerState::Collecting => break,
                    GobblerState::Terminated => return,
                    _ => {
                        inner = shared
                            .cond
                            .wait(inner)
                            .unwrap_or_else(|e| e.into_inner());
                    }
                }
            }
        }
        loop {
            line.clear();
            match source.read_line(&mut line) {
                Ok(0) => {
                    terminate_stream(shared);
                    return;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("stream read failed: {}", e);
                    terminate_stream(shared);
                    return;
                }
            }
            let text = line.trim_end_matches(['\n', '\r']);
            let mut inner = shared.lock();
            if inner.state == GobblerState::Terminated {
                return;
            }
            if text == shared.token {
                inner.state = GobblerState::Done;
                inner.sink = None;
                shared.cond.notify_all();
                break;
            }
            if let Some(sink) = &inner.sink {
                if let Ok(mut lines) = sink.lock() {
                    lines.push(text.to_string());
                }
            }
        }
    }
}

fn terminate_stream(shared: &Shared) {
    let mut inner = shared.lock();
    inner.state = GobblerState::Terminated;
    inner.sink = None;
    shared.cond.notify_all();
}
