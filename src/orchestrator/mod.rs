// src/orchestrator/mod.rs

//! Task orchestration.
//!
//! The [`Orchestrator`] owns the task list, sequences execution through an
//! [`ExecBackend`], and applies the abort/continue policy.
//!
//! - [`resolve`] merges orchestrator defaults into each task's settings.
//! - [`policy`] is the pure abort/continue decision and failure collection.
//! - [`session`] drives a single task through one exec session.

pub mod policy;
pub mod resolve;
mod session;

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::backend::ExecBackend;
use crate::errors::{Result, SeqexecError, TaskFailure};
use crate::task::Task;
use crate::types::{ExecutionMode, OutputCallback, StateCallback};

pub use policy::{SeriesReport, SeriesStep};
pub use resolve::{EffectiveTaskConfig, TaskDefaults};

use session::execute_task;

/// Runs a list of [`Task`]s inside one container.
///
/// Built once, filled with tasks, run once, then discarded. Inspect the tasks
/// through [`tasks`](Self::tasks) after [`run`](Self::run) for exit codes and
/// captured output.
pub struct Orchestrator<B: ExecBackend> {
    backend: B,
    container_id: String,
    mode: ExecutionMode,
    defaults: TaskDefaults,
    tasks: Vec<Task>,
    state_callback: Option<StateCallback>,
}

impl<B: ExecBackend> Orchestrator<B> {
    pub fn new(backend: B, container_id: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            backend,
            container_id: container_id.into(),
            mode,
            defaults: TaskDefaults::default(),
            tasks: Vec::new(),
            state_callback: None,
        }
    }

    /// Run every task privileged unless it says otherwise.
    pub fn with_default_privileged(mut self, privileged: bool) -> Self {
        self.defaults.privileged = privileged;
        self
    }

    /// Output callback for tasks that don't carry their own.
    pub fn with_default_output(mut self, callback: OutputCallback) -> Self {
        self.defaults.output_callback = Some(callback);
        self
    }

    pub fn set_state_callback(&mut self, callback: StateCallback) {
        self.state_callback = Some(callback);
    }

    /// Append one task.
    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Append several tasks, preserving their order.
    pub fn add_all<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        self.tasks.extend(tasks);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute all tasks.
    ///
    /// Returns the per-task failures (non-zero exits, ordered by task index)
    /// or a run-level error for infrastructure faults. A non-zero exit code
    /// is never reported as `Err`.
    pub async fn run(&mut self) -> Result<Vec<TaskFailure>> {
        info!(
            container = %self.container_id,
            mode = ?self.mode,
            tasks = self.tasks.len(),
            "run started"
        );

        self.backend
            .inspect_container(&self.container_id)
            .await
            .map_err(|err| {
                error!(container = %self.container_id, error = %err, "container unavailable");
                SeqexecError::ContainerUnavailable {
                    container: self.container_id.clone(),
                    source: err.into(),
                }
            })?;

        let failures = match self.mode {
            ExecutionMode::Serial => self.run_serial().await?,
            ExecutionMode::Parallel => self.run_parallel().await?,
        };

        info!(failures = failures.len(), "run finished");
        Ok(failures)
    }

    async fn run_serial(&mut self) -> Result<Vec<TaskFailure>> {
        let mut report = SeriesReport::new();
        let total = self.tasks.len();

        for (index, task) in self.tasks.iter_mut().enumerate() {
            let exit_code = execute_task(
                &self.backend,
                &self.container_id,
                index,
                task,
                &self.defaults,
                self.state_callback.as_ref(),
            )
            .await?;

            if exit_code != 0 {
                warn!(task = index, exit_code, "task exited non-zero");
            }

            if report.record(index, exit_code, task.aborts_series_on_fail()) == SeriesStep::Abort {
                warn!(
                    task = index,
                    skipped = total - index - 1,
                    "task failed with abort_series_on_fail; skipping remaining tasks"
                );
                break;
            }
        }

        Ok(report.into_failures())
    }

    /// All tasks at once, each with its own session and adapters.
    ///
    /// There is no series to abort, so `abort_series_on_fail` is ignored. An
    /// infrastructure failure does not cancel siblings already in flight;
    /// once all have settled, the lowest-index failure is returned.
    async fn run_parallel(&mut self) -> Result<Vec<TaskFailure>> {
        let backend = &self.backend;
        let container_id = self.container_id.as_str();
        let defaults = &self.defaults;
        let state_callback = self.state_callback.as_ref();

        let runs = self
            .tasks
            .iter_mut()
            .enumerate()
            .map(|(index, task)| async move {
                let outcome =
                    execute_task(backend, container_id, index, task, defaults, state_callback)
                        .await;
                (index, outcome)
            });

        let mut report = SeriesReport::new();
        let mut fatal: Option<SeqexecError> = None;

        // join_all yields in input order, so the first error kept is the
        // lowest-index one.
        for (index, outcome) in join_all(runs).await {
            match outcome {
                Ok(exit_code) => {
                    if exit_code != 0 {
                        warn!(task = index, exit_code, "task exited non-zero");
                    }
                    report.record(index, exit_code, false);
                }
                Err(err) if fatal.is_none() => fatal = Some(err),
                Err(err) => {
                    error!(task = index, error = %err, "additional infrastructure failure");
                }
            }
        }

        match fatal {
            Some(err) => Err(err),
            None => Ok(report.into_failures()),
        }
    }
}
