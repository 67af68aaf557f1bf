// src/backend/docker.rs

//! Docker Engine implementation of [`ExecBackend`] built on `bollard`.

use std::io;
use std::time::Duration;

use anyhow::{Context, bail};
use bollard::container::{InspectContainerOptions, LogOutput};
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::{API_DEFAULT_VERSION, Docker};
use futures::StreamExt;
use tracing::{debug, trace, warn};

use crate::stream::StreamSink;

use super::{BackendFuture, ExecBackend, SessionHandle, SessionRequest};

/// Socket used when neither the caller nor `DOCKER_HOST` names a daemon.
pub const DEFAULT_DOCKER_SOCKET: &str = "unix:///var/run/docker.sock";

const CONNECT_TIMEOUT_SECS: u64 = 120;

const FIRST_POLL_DELAY: Duration = Duration::from_millis(10);
const MAX_POLL_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DockerBackend {
    docker: Docker,
}

impl DockerBackend {
    /// Connect to the daemon at `docker_host`, else `DOCKER_HOST`, else
    /// [`DEFAULT_DOCKER_SOCKET`].
    ///
    /// Accepts `unix://` sockets, bare socket paths and `http://`/`tcp://` URLs.
    pub fn connect(docker_host: Option<&str>) -> anyhow::Result<Self> {
        let host = daemon_address(docker_host, std::env::var("DOCKER_HOST").ok());

        let docker = if host.starts_with("unix://") || host.starts_with('/') {
            Docker::connect_with_socket(&host, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
                .with_context(|| format!("connecting to docker socket {host}"))?
        } else {
            let url = host.replacen("tcp://", "http://", 1);
            Docker::connect_with_http(&url, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)
                .with_context(|| format!("connecting to docker host {host}"))?
        };
        debug!(%host, "docker client ready");
        Ok(Self { docker })
    }
}

fn daemon_address(explicit: Option<&str>, from_env: Option<String>) -> String {
    explicit
        .map(str::to_string)
        .or(from_env.filter(|h| !h.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DOCKER_SOCKET.to_string())
}

fn ensure_running(container_id: &str, running: Option<bool>) -> anyhow::Result<()> {
    if running != Some(true) {
        bail!("container {container_id} is not running");
    }
    Ok(())
}

/// Send one attached frame to the sink for its stream. Stdin echoes are
/// dropped; TTY (`Console`) output counts as stdout.
fn route_frame(frame: LogOutput, stdout: &StreamSink, stderr: &StreamSink) -> io::Result<()> {
    match frame {
        LogOutput::StdOut { message } | LogOutput::Console { message } => {
            stdout.write_chunk(&message)
        }
        LogOutput::StdErr { message } => stderr.write_chunk(&message),
        LogOutput::StdIn { .. } => Ok(()),
    }
}

/// Where an exec stands according to one `inspect_exec` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecStatus {
    Running,
    Exited(i64),
    /// Finished, yet the daemon has no exit code for it.
    Lost,
}

/// The attach stream can close before the daemon records the exit, so an
/// exec only counts as finished once it reports `running: false`.
fn exec_status(running: Option<bool>, exit_code: Option<i64>) -> ExecStatus {
    match (running, exit_code) {
        (Some(true), _) => ExecStatus::Running,
        (_, Some(code)) => ExecStatus::Exited(code),
        (Some(false), None) => ExecStatus::Lost,
        (None, None) => ExecStatus::Running,
    }
}

fn next_poll_delay(current: Duration) -> Duration {
    (current * 2).min(MAX_POLL_DELAY)
}

impl ExecBackend for DockerBackend {
    fn inspect_container<'a>(&'a self, container_id: &'a str) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let info = self
                .docker
                .inspect_container(container_id, None::<InspectContainerOptions>)
                .await
                .with_context(|| format!("inspecting container {container_id}"))?;

            ensure_running(container_id, info.state.and_then(|state| state.running))
        })
    }

    fn create_session<'a>(&'a self, request: SessionRequest) -> BackendFuture<'a, SessionHandle> {
        Box::pin(async move {
            let options = CreateExecOptions {
                cmd: Some(request.command.clone()),
                attach_stdout: Some(request.attach_stdout),
                attach_stderr: Some(request.attach_stderr),
                privileged: Some(request.privileged),
                ..Default::default()
            };

            let created = self
                .docker
                .create_exec(&request.container_id, options)
                .await
                .with_context(|| {
                    format!(
                        "creating exec in container {} for {:?}",
                        request.container_id, request.command
                    )
                })?;

            debug!(exec_id = %created.id, "exec session created");
            Ok(SessionHandle::new(created.id))
        })
    }

    fn start_session<'a>(
        &'a self,
        session: &'a SessionHandle,
        stdout: StreamSink,
        stderr: StreamSink,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let started = self
                .docker
                .start_exec(
                    &session.id,
                    Some(StartExecOptions {
                        detach: false,
                        ..Default::default()
                    }),
                )
                .await
                .with_context(|| format!("starting exec {}", session.id))?;

            let mut output = match started {
                StartExecResults::Attached { output, .. } => output,
                // Nothing attached; `inspect_session` waits for the exit.
                StartExecResults::Detached => return Ok(()),
            };

            while let Some(frame) = output.next().await {
                let frame = frame.with_context(|| format!("reading output of exec {}", session.id))?;
                if let Err(err) = route_frame(frame, &stdout, &stderr) {
                    warn!(exec_id = %session.id, error = %err, "dropping exec output; stream reader gone");
                }
            }

            // `stdout`/`stderr` drop here, closing both streams.
            Ok(())
        })
    }

    fn inspect_session<'a>(&'a self, session: &'a SessionHandle) -> BackendFuture<'a, i64> {
        Box::pin(async move {
            let mut delay = FIRST_POLL_DELAY;
            loop {
                let inspected = self
                    .docker
                    .inspect_exec(&session.id)
                    .await
                    .with_context(|| format!("inspecting exec {}", session.id))?;

                match exec_status(inspected.running, inspected.exit_code) {
                    ExecStatus::Exited(code) => return Ok(code),
                    ExecStatus::Lost => bail!("exec {} finished without an exit code", session.id),
                    ExecStatus::Running => {
                        trace!(exec_id = %session.id, ?delay, "exec still running");
                        tokio::time::sleep(delay).await;
                        delay = next_poll_delay(delay);
                    }
                }
            }
        })
    }
}
