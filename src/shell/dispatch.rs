//! Batch dispatch
//!
//! Serializes command batches onto the interpreter. A batch holds the batch
//! lock from first write to final sentinel, appends per-command redirections
//! for streams nobody is listening to, and terminates with one sentinel echo
//! per stream so both gobblers can finish independently.

use std::io::{self, Write};
use std::process::ChildStdin;
use std::sync::Arc;

use crate::execution::{workers, ContextHandle};
use crate::models::{LineSink, ShellStatus};
use crate::shell::session::{lock_unpoisoned, ShellSession};

/// Callback invoked with the batch's sinks once the batch completes.
pub type BatchCallback = Box<dyn FnOnce(Option<LineSink>, Option<LineSink>) + Send + 'static>;

impl ShellSession {
    /// Runs `commands` as one serialized batch, blocking until the sentinel
    /// has been observed on both streams.
    ///
    /// Lines written by the interpreter to stdout land in `output`, stderr
    /// lines in `diagnostic`; a `None` sink redirects that stream to
    /// `/dev/null` per command instead. Write failures degrade the session
    /// to [`ShellStatus::Unknown`] rather than surfacing an error; output
    /// collected before the failure stays in the sinks.
    pub fn run(&self, commands: &[&str], output: Option<LineSink>, diagnostic: Option<LineSink>) {
        let mut channel = lock_unpoisoned(&self.channel);
        if !self.status().is_live() {
            debug!("batch dropped: session is not live");
            return;
        }
        let stdin = match channel.stdin.as_mut() {
            Some(stdin) => stdin,
            None => {
                debug!("batch dropped: command channel is gone");
                return;
            }
        };
        let capture_out = output.is_some();
        let capture_err = diagnostic.is_some();
        self.stdout_gobbler.begin(output);
        self.stderr_gobbler.begin(diagnostic);
        if let Err(e) = self.write_batch(stdin, commands, capture_out, capture_err) {
            warn!("batch write failed: {}", e);
            let mut status = lock_unpoisoned(&self.status);
            if status.is_live() {
                *status = ShellStatus::Unknown;
            }
            return;
        }
        self.stdout_gobbler.wait_done();
        self.stderr_gobbler.wait_done();
    }

    /// Submits `commands` to the worker pool and returns immediately.
    ///
    /// The batch still takes the batch lock on the worker, so it serializes
    /// with every other batch. When `on_result` is given it is invoked with
    /// the sinks after the batch completes; if `context` is given and the
    /// caller is currently on that context's home thread, the callback is
    /// marshaled back onto it.
    pub fn run_async(
        self: &Arc<Self>,
        commands: Vec<String>,
        output: Option<LineSink>,
        diagnostic: Option<LineSink>,
        on_result: Option<BatchCallback>,
        context: Option<&ContextHandle>,
    ) {
        // Whether to marshal is decided at submit time, on the caller's
        // thread, not later on the worker.
        let home = context.filter(|c| c.is_current()).cloned();
        let session = Arc::clone(self);
        workers::execute("batch", move || {
            let refs: Vec<&str> = commands.iter().map(String::as_str).collect();
            session.run(&refs, output.clone(), diagnostic.clone());
            if let Some(callback) = on_result {
                let deliver = move || callback(output, diagnostic);
                match home {
                    Some(context) => context.run(deliver),
                    None => deliver(),
                }
            }
        });
    }

    fn write_batch(
        &self,
        stdin: &mut ChildStdin,
        commands: &[&str],
        capture_out: bool,
        capture_err: bool,
    ) -> io::Result<()> {
        let suffix = redirection_suffix(capture_out, capture_err);
        for command in commands {
            if self.log_commands {
                trace!("> {}", command);
            }
            stdin.write_all(format!("{}{}\n", command, suffix).as_bytes())?;
            stdin.flush()?;
        }
        let epilogue = format!("echo {t}\necho {t} >&2\n", t = self.token);
        stdin.write_all(epilogue.as_bytes())?;
        stdin.flush()
    }
}

fn redirection_suffix(capture_out: bool, capture_err: bool) -> &'static str {
    match (capture_out, capture_err) {
        (true, true) => "",
        (false, true) => " >/dev/null",
        (true, false) => " 2>/dev/null",
        (false, false) => " >/dev/null 2>/dev/null",
    }
}
