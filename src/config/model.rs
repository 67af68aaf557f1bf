// src/config/model.rs

use serde::Deserialize;

use crate::task::Task;
use crate::types::ExecutionMode;

/// Series file as read from TOML, before validation.
///
/// ```toml
/// [run]
/// container = "8b86980c5770"
/// mode = "serial"
/// privileged = false
///
/// [[task]]
/// cmd = ["sh", "-c", "echo hello"]
/// abort_series_on_fail = true
/// keep_output = true
/// ```
///
/// Use [`SeriesFile::try_from`] (or
/// [`load_and_validate`](crate::config::load_and_validate)) to get a checked
/// [`SeriesFile`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeriesFile {
    #[serde(default)]
    pub run: RunSection,

    /// Tasks in execution order (`[[task]]` array of tables).
    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// `[run]` section: orchestrator-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Target container id or name. May be left out when given on the CLI.
    #[serde(default)]
    pub container: Option<String>,

    #[serde(default)]
    pub mode: ExecutionMode,

    /// Default privilege for tasks that don't request it themselves.
    #[serde(default)]
    pub privileged: bool,

    /// Docker daemon address (`unix:///var/run/docker.sock`, `tcp://host:2375`).
    #[serde(default)]
    pub docker_host: Option<String>,

    /// Print task output to this process' stdout/stderr as it arrives.
    #[serde(default = "default_stream_output")]
    pub stream_output: bool,
}

fn default_stream_output() -> bool {
    true
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            container: None,
            mode: ExecutionMode::default(),
            privileged: false,
            docker_host: None,
            stream_output: default_stream_output(),
        }
    }
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Program followed by its arguments.
    pub cmd: Vec<String>,

    #[serde(default)]
    pub abort_series_on_fail: bool,

    #[serde(default)]
    pub privileged: bool,

    #[serde(default)]
    pub keep_output: bool,
}

impl TaskConfig {
    pub fn to_task(&self) -> Task {
        Task::new(self.cmd.iter().cloned())
            .abort_series_on_fail(self.abort_series_on_fail)
            .privileged(self.privileged)
            .keep_output(self.keep_output)
    }
}

/// A validated series file.
#[derive(Debug, Clone)]
pub struct SeriesFile {
    pub run: RunSection,
    pub task: Vec<TaskConfig>,
}

impl SeriesFile {
    /// Build without validation. Only `validate.rs` should call this.
    pub(crate) fn new_unchecked(run: RunSection, task: Vec<TaskConfig>) -> Self {
        Self { run, task }
    }

    /// Fresh, not-yet-run tasks in file order.
    pub fn to_tasks(&self) -> Vec<Task> {
        self.task.iter().map(TaskConfig::to_task).collect()
    }
}
