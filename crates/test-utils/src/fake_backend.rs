use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail};
use seqexec::backend::{BackendFuture, ExecBackend, SessionHandle, SessionRequest};
use seqexec::stream::StreamSink;

/// Scripted behaviour for one command.
#[derive(Debug, Clone, Default)]
pub struct FakeExec {
    /// Output frames in emission order; `true` = stdout.
    frames: Vec<(bool, Vec<u8>)>,
    exit_code: i64,
    delay: Option<Duration>,
    fail_create: bool,
    fail_start: bool,
    fail_inspect: bool,
}

impl FakeExec {
    /// Command that exits with `code` and prints nothing.
    pub fn exit(code: i64) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    pub fn stdout(mut self, chunk: impl AsRef<[u8]>) -> Self {
        self.frames.push((true, chunk.as_ref().to_vec()));
        self
    }

    pub fn stderr(mut self, chunk: impl AsRef<[u8]>) -> Self {
        self.frames.push((false, chunk.as_ref().to_vec()));
        self
    }

    /// Sleep before finishing the session, after emitting output.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn fail_inspect(mut self) -> Self {
        self.fail_inspect = true;
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: usize,
    sessions: HashMap<String, (Vec<String>, FakeExec)>,
    requests: Vec<SessionRequest>,
    started: Vec<Vec<String>>,
    container_checks: usize,
}

/// In-memory [`ExecBackend`] that:
/// - knows a fixed set of running containers
/// - replays scripted output and exit codes per command (unscripted commands
///   exit 0 silently)
/// - records every session request and start, in order.
///
/// Clones share their recordings, so keep a clone to inspect after handing
/// one to an orchestrator.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    containers: HashSet<String>,
    scripts: HashMap<Vec<String>, FakeExec>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running container.
    pub fn with_container(mut self, id: &str) -> Self {
        self.containers.insert(id.to_string());
        self
    }

    /// Script the behaviour of `command`.
    pub fn script<S: AsRef<str>>(mut self, command: &[S], exec: FakeExec) -> Self {
        let key = command.iter().map(|s| s.as_ref().to_string()).collect();
        self.scripts.insert(key, exec);
        self
    }

    /// Every session request received, in order.
    pub fn requests(&self) -> Vec<SessionRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Commands whose sessions were started, in start order.
    pub fn started(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().started.clone()
    }

    pub fn container_checks(&self) -> usize {
        self.state.lock().unwrap().container_checks
    }

    fn session(&self, handle: &SessionHandle) -> anyhow::Result<(Vec<String>, FakeExec)> {
        self.state
            .lock()
            .unwrap()
            .sessions
            .get(&handle.id)
            .cloned()
            .ok_or_else(|| anyhow!("no such exec: {}", handle.id))
    }
}

impl ExecBackend for FakeBackend {
    fn inspect_container<'a>(&'a self, container_id: &'a str) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            self.state.lock().unwrap().container_checks += 1;
            if !self.containers.contains(container_id) {
                bail!("No such container: {container_id}");
            }
            Ok(())
        })
    }

    fn create_session<'a>(&'a self, request: SessionRequest) -> BackendFuture<'a, SessionHandle> {
        Box::pin(async move {
            let exec = self.scripts.get(&request.command).cloned().unwrap_or_default();

            let mut state = self.state.lock().unwrap();
            state.requests.push(request.clone());
            if exec.fail_create {
                bail!("create exec refused for {:?}", request.command);
            }

            state.next_id += 1;
            let id = format!("exec-{}", state.next_id);
            state
                .sessions
                .insert(id.clone(), (request.command.clone(), exec));
            Ok(SessionHandle::new(id))
        })
    }

    fn start_session<'a>(
        &'a self,
        session: &'a SessionHandle,
        stdout: StreamSink,
        stderr: StreamSink,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let (command, exec) = self.session(session)?;
            self.state.lock().unwrap().started.push(command);
            if exec.fail_start {
                bail!("start exec failed for {}", session.id);
            }

            for (is_stdout, chunk) in &exec.frames {
                let sink = if *is_stdout { &stdout } else { &stderr };
                sink.write_chunk(chunk)?;
                tokio::task::yield_now().await;
            }

            if let Some(delay) = exec.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        })
    }

    fn inspect_session<'a>(&'a self, session: &'a SessionHandle) -> BackendFuture<'a, i64> {
        Box::pin(async move {
            let (_, exec) = self.session(session)?;
            if exec.fail_inspect {
                bail!("inspect exec failed for {}", session.id);
            }
            Ok(exec.exit_code)
        })
    }
}
