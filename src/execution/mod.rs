//! Execution contexts
//!
//! Some callers live on a designated coordinating thread (a UI loop, an
//! event loop) and need completion callbacks delivered there rather than on
//! whichever worker finished the batch. A [`ContextDispatcher`] owns such a
//! thread; [`ContextHandle`]s marshal closures onto it from anywhere.

pub mod workers;

use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle, ThreadId};

use crate::error::Result;

type ContextJob = Box<dyn FnOnce() + Send + 'static>;

enum ContextMessage {
    Task(ContextJob),
    Shutdown,
}

/// Cloneable handle for submitting work to a context's home thread.
#[derive(Clone)]
pub struct ContextHandle {
    tx: Sender<ContextMessage>,
    home: ThreadId,
}

impl ContextHandle {
    /// Whether the calling thread is this context's home thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.home
    }

    /// Runs `task` on the home thread.
    ///
    /// When already on the home thread the task runs inline, immediately.
    /// Otherwise it is queued and runs after everything queued before it.
    pub fn run(&self, task: impl FnOnce() + Send + 'static) {
        if self.is_current() {
            task();
        } else if self
            .tx
            .send(ContextMessage::Task(Box::new(task)))
            .is_err()
        {
            warn!("context is shut down; task dropped");
        }
    }

    /// Runs `task` on the home thread while holding `lock`.
    ///
    /// The guard is acquired on the thread the task runs on, so inline
    /// execution takes it on the caller.
    pub fn run_locked<T>(&self, lock: Arc<Mutex<T>>, task: impl FnOnce(&mut T) + Send + 'static)
    where
        T: Send + 'static,
    {
        self.run(move || {
            let mut guard = lock.lock().unwrap_or_else(|e| e.into_inner());
            task(&mut guard);
        });
    }

    /// Runs a blocking `task` without stalling the home thread.
    ///
    /// Called from the home thread, the task is pushed to the worker pool
    /// and this call blocks for its result; work inside it that marshals
    /// back onto this context would otherwise deadlock against the caller.
    /// Called from any other thread, the task just runs inline.
    pub fn sync_on_worker<T, F>(&self, task: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        if self.is_current() {
            workers::submit("sync", task).wait()
        } else {
            Ok(task())
        }
    }
}

/// Owns a coordinating thread that drains marshaled tasks in FIFO order.
pub struct ContextDispatcher {
    handle: ContextHandle,
    join: Option<JoinHandle<()>>,
}

impl ContextDispatcher {
    /// Spawns the coordinating thread.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<ContextMessage>();
        let join = thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(ContextMessage::Task(job)) => job(),
                    Ok(ContextMessage::Shutdown) | Err(_) => break,
                }
            }
            debug!("context drained and shut down");
        });
        let home = join.thread().id();
        ContextDispatcher {
            handle: ContextHandle { tx, home },
            join: Some(join),
        }
    }

    /// A handle for marshaling onto this context from other threads.
    pub fn handle(&self) -> ContextHandle {
        self.handle.clone()
    }

    /// Drains everything queued so far and joins the thread.
    ///
    /// Tasks submitted through outstanding [`ContextHandle`] clones after
    /// this point are dropped with a warning.
    pub fn shutdown(self) {
        let ContextDispatcher { handle, join } = self;
        // The queue is FIFO, so everything sent before this marker still
        // runs before the thread exits.
        let _ = handle.tx.send(ContextMessage::Shutdown);
        drop(handle);
        if let Some(join) = join {
            if join.join().is_err() {
                warn!("context thread panicked");
            }
        }
    }
}
