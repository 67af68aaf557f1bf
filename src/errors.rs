// src/errors.rs

//! Crate-wide error types.
//!
//! Two families of failure exist and they never mix:
//! - [`SeqexecError`] is a run-level fault (bad container, a session that
//!   could not be created/started/inspected, bad config). It halts the run.
//! - [`TaskFailure`] records a command that ran and exited non-zero. These
//!   are collected into the run report and never returned as `Err`.

use std::fmt;

use thiserror::Error;

/// Boxed error carried as the `source` of backend-originated failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum SeqexecError {
    #[error("container '{container}' is not available: {source}")]
    ContainerUnavailable {
        container: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to create exec session for task {index}: {source}")]
    SessionCreate {
        index: usize,
        #[source]
        source: BoxError,
    },

    #[error("failed to start exec session for task {index}: {source}")]
    SessionStart {
        index: usize,
        #[source]
        source: BoxError,
    },

    #[error("failed to inspect exec session for task {index}: {source}")]
    SessionInspect {
        index: usize,
        #[source]
        source: BoxError,
    },

    #[error("stream adapter was already started")]
    AdapterAlreadyStarted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SeqexecError {
    /// True for faults raised by the execution backend (as opposed to local
    /// config or adapter misuse).
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            SeqexecError::ContainerUnavailable { .. }
                | SeqexecError::SessionCreate { .. }
                | SeqexecError::SessionStart { .. }
                | SeqexecError::SessionInspect { .. }
        )
    }
}

/// A task whose command ran to completion but exited non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFailure {
    /// Position of the task in the orchestrator's task list.
    pub index: usize,
    pub exit_code: i64,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task: {} exited with exit code: {}",
            self.index, self.exit_code
        )
    }
}

impl std::error::Error for TaskFailure {}

pub type Result<T> = std::result::Result<T, SeqexecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_failure_display_names_index_and_code() {
        let failure = TaskFailure {
            index: 2,
            exit_code: 127,
        };
        assert_eq!(failure.to_string(), "task: 2 exited with exit code: 127");
    }

    #[test]
    fn backend_errors_are_infrastructure() {
        let err = SeqexecError::SessionStart {
            index: 0,
            source: anyhow::anyhow!("connection reset").into(),
        };
        assert!(err.is_infrastructure());
        assert!(err.to_string().contains("connection reset"));

        let err = SeqexecError::ConfigError("no tasks".to_string());
        assert!(!err.is_infrastructure());
    }
}
