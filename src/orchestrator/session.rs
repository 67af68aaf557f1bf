// src/orchestrator/session.rs

//! Drives one task through a single exec session.

use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::backend::{ExecBackend, SessionRequest};
use crate::errors::{Result, SeqexecError};
use crate::stream::StreamAdapter;
use crate::task::Task;
use crate::types::{LifecycleState, OutputCallback, StateCallback};

use super::resolve::{TaskDefaults, resolve};

/// Run `task` to completion and return its exit code.
///
/// Emits `Before`, `Executing` and `After` through `state_callback`. Any
/// backend failure is returned as a run-level error and leaves the task not
/// done; a non-zero exit code is a normal return.
pub(crate) async fn execute_task<B>(
    backend: &B,
    container_id: &str,
    index: usize,
    task: &mut Task,
    defaults: &TaskDefaults,
    state_callback: Option<&StateCallback>,
) -> Result<i64>
where
    B: ExecBackend + ?Sized,
{
    emit(state_callback, LifecycleState::Before, task);

    let effective = resolve(task, defaults);

    info!(
        task = index,
        container = %container_id,
        cmd = %task.display_command(),
        privileged = effective.privileged,
        attach = effective.attach,
        "starting task"
    );

    let request = SessionRequest {
        container_id: container_id.to_string(),
        command: task.command().to_vec(),
        attach_stdout: effective.attach,
        attach_stderr: effective.attach,
        privileged: effective.privileged,
    };

    let session = backend.create_session(request).await.map_err(|err| {
        error!(task = index, error = %err, "could not create exec session");
        SeqexecError::SessionCreate {
            index,
            source: err.into(),
        }
    })?;
    debug!(task = index, session = %session.id, "exec session created");

    let capture = effective.keep_output.then(|| task.capture_buffer());
    let mut stdout = StreamAdapter::new(forward_chunks(
        effective.output_callback.clone(),
        capture.clone(),
        true,
    ))
    .with_label("stdout");
    let mut stderr = StreamAdapter::new(forward_chunks(
        effective.output_callback.clone(),
        capture,
        false,
    ))
    .with_label("stderr");

    stdout.start()?;
    stderr.start()?;

    emit(state_callback, LifecycleState::Executing, task);

    let started = backend
        .start_session(&session, stdout.writer(), stderr.writer())
        .await;

    // The session has finished (or failed); the backend dropped its sinks, so
    // stopping only waits for the readers to deliver what is buffered.
    stdout.stop().await;
    stderr.stop().await;

    if let Err(err) = started {
        error!(task = index, session = %session.id, error = %err, "exec session failed to run");
        return Err(SeqexecError::SessionStart {
            index,
            source: err.into(),
        });
    }

    let exit_code = backend.inspect_session(&session).await.map_err(|err| {
        error!(task = index, session = %session.id, error = %err, "could not inspect exec session");
        SeqexecError::SessionInspect {
            index,
            source: err.into(),
        }
    })?;

    task.complete(exit_code);
    info!(task = index, exit_code, success = (exit_code == 0), "task finished");

    emit(state_callback, LifecycleState::After, task);

    Ok(exit_code)
}

/// Callback for one stream: forward to the output callback tagged with the
/// stream flag, and append to the capture buffer when output is kept.
fn forward_chunks(
    output: Option<OutputCallback>,
    capture: Option<Arc<Mutex<Vec<u8>>>>,
    is_stdout: bool,
) -> impl FnMut(&[u8]) + Send + 'static {
    move |chunk: &[u8]| {
        if let Some(callback) = &output {
            callback(chunk, is_stdout);
        }
        if let Some(buffer) = &capture {
            match buffer.lock() {
                Ok(mut buf) => buf.extend_from_slice(chunk),
                Err(poisoned) => poisoned.into_inner().extend_from_slice(chunk),
            }
        }
    }
}

fn emit(callback: Option<&StateCallback>, state: LifecycleState, task: &Task) {
    debug!(%state, cmd = %task.display_command(), "task lifecycle");
    if let Some(callback) = callback {
        callback(state, task);
    }
}
