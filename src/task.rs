// src/task.rs

//! A single command plus its execution policy and captured results.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::types::OutputCallback;

/// Unit of work executed inside the target container.
///
/// Policy fields are set with the builder-style methods before the task is
/// handed to an [`Orchestrator`](crate::orchestrator::Orchestrator); results
/// (`exit_code`, `is_done`, `captured_output`) are filled in by the run.
pub struct Task {
    command: Vec<String>,
    abort_series_on_fail: bool,
    privileged: bool,
    output_callback: Option<OutputCallback>,
    keep_output: bool,
    captured: Arc<Mutex<Vec<u8>>>,
    exit_code: Option<i64>,
    done: bool,
}

impl Task {
    /// New task running `command` (program followed by its arguments).
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            abort_series_on_fail: false,
            privileged: false,
            output_callback: None,
            keep_output: false,
            captured: Arc::new(Mutex::new(Vec::new())),
            exit_code: None,
            done: false,
        }
    }

    /// Stop the remaining series if this task exits non-zero.
    pub fn abort_series_on_fail(mut self, abort: bool) -> Self {
        self.abort_series_on_fail = abort;
        self
    }

    pub fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Per-task output callback; takes precedence over the orchestrator's.
    pub fn output_callback(mut self, callback: OutputCallback) -> Self {
        self.output_callback = Some(callback);
        self
    }

    /// Accumulate stdout and stderr, in arrival order, into
    /// [`captured_output`](Self::captured_output).
    pub fn keep_output(mut self, keep: bool) -> Self {
        self.keep_output = keep;
        self
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn aborts_series_on_fail(&self) -> bool {
        self.abort_series_on_fail
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn callback(&self) -> Option<&OutputCallback> {
        self.output_callback.as_ref()
    }

    pub fn keeps_output(&self) -> bool {
        self.keep_output
    }

    /// Snapshot of the captured output. Empty unless `keep_output` was set.
    pub fn captured_output(&self) -> Vec<u8> {
        match self.captured.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Exit code of the command; `None` until the task is done.
    pub fn exit_code(&self) -> Option<i64> {
        self.exit_code
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Human-readable command line for logs.
    pub fn display_command(&self) -> String {
        self.command.join(" ")
    }

    /// Shared handle on the capture buffer, appended to by both stream
    /// adapters.
    pub(crate) fn capture_buffer(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.captured)
    }

    /// Record the final exit code. A task completes at most once; later calls
    /// are ignored and return `false`.
    pub(crate) fn complete(&mut self, exit_code: i64) -> bool {
        if self.done {
            return false;
        }
        self.exit_code = Some(exit_code);
        self.done = true;
        true
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("command", &self.command)
            .field("abort_series_on_fail", &self.abort_series_on_fail)
            .field("privileged", &self.privileged)
            .field("has_output_callback", &self.output_callback.is_some())
            .field("keep_output", &self.keep_output)
            .field("exit_code", &self.exit_code)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
