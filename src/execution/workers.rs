//! Shared worker pool
//!
//! An unbounded pool of cached worker threads. Submitting a job reuses an
//! idle worker when one is parked on the queue; otherwise a fresh thread is
//! spawned. Workers that sit idle past [`IDLE_TTL`] exit on their own, so
//! the pool shrinks back to nothing when the process goes quiet.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// How long an idle worker lingers before exiting.
const IDLE_TTL: Duration = Duration::from_secs(30);

type Job = Box<dyn FnOnce() + Send + 'static>;

static POOL: Lazy<WorkerPool> = Lazy::new(WorkerPool::new);
static NEXT_WORKER_ID: AtomicUsize = AtomicUsize::new(0);

struct PoolState {
    queue: VecDeque<Job>,
    /// Workers currently parked on the condvar. Maintained under the same
    /// lock as the queue so the spawn-or-notify decision cannot race a
    /// worker timing out.
    idle: usize,
}

struct WorkerPool {
    state: Arc<(Mutex<PoolState>, Condvar)>,
}

impl WorkerPool {
    fn new() -> Self {
        WorkerPool {
            state: Arc::new((
                Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    idle: 0,
                }),
                Condvar::new(),
            )),
        }
    }

    fn execute(&self, label: &str, job: Job) {
        let (lock, cond) = &*self.state;
        let mut state = lock.lock().unwrap_or_else(|e| e.into_inner());
        state.queue.push_back(job);
        if state.idle > 0 {
            cond.notify_one();
            return;
        }
        drop(state);
        let name = format!(
            "shellmux-{}-{}",
            label,
            NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed)
        );
        let shared = Arc::clone(&self.state);
        let spawned = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(&shared));
        if let Err(e) = spawned {
            error!("failed to spawn worker thread: {}", e);
        }
    }
}

fn worker_loop(shared: &Arc<(Mutex<PoolState>, Condvar)>) {
    let (lock, cond) = &**shared;
    loop {
        let job = {
            let mut state = lock.lock().unwrap_or_else(|e| e.into_inner());
            loop {
                if let Some(job) = state.queue.pop_front() {
                    break job;
                }
                state.idle += 1;
                let (next, timeout) = cond
                    .wait_timeout(state, IDLE_TTL)
                    .unwrap_or_else(|e| e.into_inner());
                state = next;
                state.idle -= 1;
                if timeout.timed_out() && state.queue.is_empty() {
                    return;
                }
            }
        };
        job();
    }
}

/// Runs `task` on the pool, fire and forget.
pub fn execute(label: &str, task: impl FnOnce() + Send + 'static) {
    POOL.execute(label, Box::new(task));
}

/// Runs `task` on the pool and returns a handle for its result.
pub fn submit<T>(label: &str, task: impl FnOnce() -> T + Send + 'static) -> TaskHandle<T>
where
    T: Send + 'static,
{
    let (tx, rx) = std::sync::mpsc::channel();
    execute(label, move || {
        let _ = tx.send(task());
    });
    TaskHandle { rx }
}

/// Pending result of a pooled task.
pub struct TaskHandle<T> {
    rx: std::sync::mpsc::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task finishes.
    ///
    /// Fails with [`Error::WorkerLost`] if the worker panicked or its
    /// result was otherwise dropped.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| Error::WorkerLost)
    }
}
