#![allow(dead_code)]

use seqexec::config::{RawSeriesFile, RunSection, SeriesFile, TaskConfig};
use seqexec::types::ExecutionMode;

/// Builder for `SeriesFile` to simplify test setup.
pub struct SeriesFileBuilder {
    config: RawSeriesFile,
}

impl SeriesFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawSeriesFile {
                run: RunSection::default(),
                task: Vec::new(),
            },
        }
    }

    pub fn container(mut self, id: &str) -> Self {
        self.config.run.container = Some(id.to_string());
        self
    }

    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.config.run.mode = mode;
        self
    }

    pub fn privileged(mut self, val: bool) -> Self {
        self.config.run.privileged = val;
        self
    }

    pub fn stream_output(mut self, val: bool) -> Self {
        self.config.run.stream_output = val;
        self
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.config.task.push(task);
        self
    }

    pub fn build(self) -> SeriesFile {
        SeriesFile::try_from(self.config).expect("Failed to build valid series file from builder")
    }
}

impl Default for SeriesFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(cmd: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                cmd: cmd.iter().map(|s| s.to_string()).collect(),
                abort_series_on_fail: false,
                privileged: false,
                keep_output: false,
            },
        }
    }

    pub fn abort_series_on_fail(mut self, val: bool) -> Self {
        self.task.abort_series_on_fail = val;
        self
    }

    pub fn privileged(mut self, val: bool) -> Self {
        self.task.privileged = val;
        self
    }

    pub fn keep_output(mut self, val: bool) -> Self {
        self.task.keep_output = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
