//! Shell session lifecycle
//!
//! A [`ShellSession`] wraps one long-lived command interpreter subprocess.
//! Opening a session spawns the process, verifies over its own pipes that it
//! actually behaves like a shell, probes for elevated privileges, and starts
//! one gobbler per output stream. Batches are then written through
//! [`run`](ShellSession::run) and delimited with a session-unique sentinel
//! token.

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::models::{ShellStatus, SpawnSpec};
use crate::shell::gobbler::StreamGobbler;

/// Marker echoed back by a real interpreter during the open handshake.
const PROBE_MARKER: &str = "SHELLMUX_PROBE";

/// Substring of `id` output that identifies the superuser.
const ROOT_UID_MARKER: &str = "uid=0";

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Write side of the interpreter, guarded by the batch lock.
pub(crate) struct CommandChannel {
    /// `None` once the session is closed.
    pub(crate) stdin: Option<ChildStdin>,
}

/// One persistent interpreter subprocess and its collection machinery.
pub struct ShellSession {
    /// Batch lock: held for the full duration of every batch, so at most one
    /// batch is on the wire at a time.
    pub(crate) channel: Mutex<CommandChannel>,
    pub(crate) process: Mutex<Child>,
    pub(crate) status: Mutex<ShellStatus>,
    pub(crate) stdout_gobbler: StreamGobbler,
    pub(crate) stderr_gobbler: StreamGobbler,
    pub(crate) token: String,
    pub(crate) log_commands: bool,
    spec: SpawnSpec,
    opened_at: DateTime<Utc>,
}

impl ShellSession {
    /// Opens a session with default options.
    pub fn open(spec: SpawnSpec) -> Result<Self> {
        Self::open_with(spec, &SessionConfig::default())
    }

    /// Spawns the interpreter described by `spec` and brings the session up.
    ///
    /// The handshake writes an `echo` of a fixed marker and requires the
    /// marker back on stdout before anything else is read. A process that
    /// does not echo it is killed and reported as [`Error::NotAShell`].
    pub fn open_with(spec: SpawnSpec, options: &SessionConfig) -> Result<Self> {
        let command_line = spec.command_line();
        let mut child = spec.command().spawn().map_err(|e| Error::SpawnFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;
        debug!("spawned interpreter pid={} ({})", child.id(), command_line);

        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                reap(&mut child);
                return Err(Error::ChannelUnavailable { channel: "stdin" });
            }
        };
        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                reap(&mut child);
                return Err(Error::ChannelUnavailable { channel: "stdout" });
            }
        };
        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                reap(&mut child);
                return Err(Error::ChannelUnavailable { channel: "stderr" });
            }
        };

        // The handshake reads through the same buffered reader that is later
        // handed to the gobbler, so no bytes are lost in between.
        let mut stdin = stdin;
        let mut stdout_reader = BufReader::new(stdout);
        let stderr_reader = BufReader::new(stderr);

        if let Err(e) = handshake(&mut stdin, &mut stdout_reader) {
            debug!("handshake failed: {}", e);
            reap(&mut child);
            return Err(Error::NotAShell {
                command: command_line,
            });
        }

        let mut status = ShellStatus::NonRoot;
        if options.probe_root {
            match probe_root(&mut stdin, &mut stdout_reader) {
                Ok(true) => status = ShellStatus::Root,
                Ok(false) => {}
                // A failed privilege probe leaves the session usable.
                Err(e) => debug!("privilege probe failed: {}", e),
            }
        }

        let token = Uuid::new_v4().simple().to_string();
        trace!("session token: {}", token);
        let stdout_gobbler = StreamGobbler::spawn(stdout_reader, token.clone(), "stdout");
        let stderr_gobbler = StreamGobbler::spawn(stderr_reader, token.clone(), "stderr");

        debug!("session open, status={}", status);
        Ok(ShellSession {
            channel: Mutex::new(CommandChannel { stdin: Some(stdin) }),
            process: Mutex::new(child),
            status: Mutex::new(status),
            stdout_gobbler,
            stderr_gobbler,
            token,
            log_commands: options.log_commands,
            spec,
            opened_at: Utc::now(),
        })
    }

    /// Current session status.
    pub fn status(&self) -> ShellStatus {
        *lock_unpoisoned(&self.status)
    }

    /// Whether the interpreter runs with elevated privileges.
    pub fn is_root(&self) -> bool {
        self.status().is_root()
    }

    /// The spawn description this session was opened with.
    pub fn spec(&self) -> &SpawnSpec {
        &self.spec
    }

    /// When the session finished opening.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Whether the session can still accept batches.
    ///
    /// A batch currently holding the batch lock counts as proof of life;
    /// otherwise the subprocess itself is polled without blocking.
    pub fn is_alive(&self) -> bool {
        if !self.status().is_live() {
            return false;
        }
        let in_flight = match self.channel.try_lock() {
            Ok(guard) => {
                drop(guard);
                false
            }
            Err(std::sync::TryLockError::WouldBlock) => true,
            Err(std::sync::TryLockError::Poisoned(p)) => {
                drop(p.into_inner());
                false
            }
        };
        if in_flight {
            return true;
        }
        let mut child = lock_unpoisoned(&self.process);
        match child.try_wait() {
            Ok(Some(exit)) => {
                debug!("interpreter exited: {}", exit);
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("could not poll interpreter: {}", e);
                false
            }
        }
    }

    /// Shuts the session down: waits for any in-flight batch, closes the
    /// command channel, kills the interpreter and reaps it. Idempotent.
    pub fn close(&self) {
        let mut channel = lock_unpoisoned(&self.channel);
        {
            let mut status = lock_unpoisoned(&self.status);
            if *status == ShellStatus::Closed {
                return;
            }
            *status = ShellStatus::Closed;
        }
        debug!("closing session");
        self.stdout_gobbler.terminate();
        self.stderr_gobbler.terminate();
        // Dropping stdin closes the write end; killing the child then EOFs
        // the read ends, which unblocks the gobbler threads.
        channel.stdin.take();
        let mut child = lock_unpoisoned(&self.process);
        if let Err(e) = child.kill() {
            debug!("kill on close: {}", e);
        }
        match child.wait() {
            Ok(exit) => debug!("interpreter reaped: {}", exit),
            Err(e) => debug!("reap on close: {}", e),
        }
    }
}

impl Drop for ShellSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("kill during open: {}", e);
    }
    if let Err(e) = child.wait() {
        debug!("reap during open: {}", e);
    }
}

fn handshake(stdin: &mut ChildStdin, stdout: &mut impl BufRead) -> io::Result<()> {
    stdin.write_all(format!("echo {}\n", PROBE_MARKER).as_bytes())?;
    stdin.flush()?;
    let mut line = String::new();
    stdout.read_line(&mut line)?;
    if line.contains(PROBE_MARKER) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "probe marker was not echoed back",
        ))
    }
}

fn probe_root(stdin: &mut ChildStdin, stdout: &mut impl BufRead) -> io::Result<bool> {
    stdin.write_all(b"id\n")?;
    stdin.flush()?;
    let mut line = String::new();
    stdout.read_line(&mut line)?;
    Ok(line.contains(ROOT_UID_MARKER))
}
