// src/orchestrator/policy.rs

//! Pure failure policy for a series of tasks.
//!
//! No Tokio, no backend: given each task's exit code and abort flag, decide
//! whether the series continues and collect the per-task failures. This keeps
//! the abort/continue semantics unit-testable without any IO.

use crate::errors::TaskFailure;

/// What the series does after a task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStep {
    Continue,
    Abort,
}

/// Accumulated per-task failures of one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeriesReport {
    failures: Vec<TaskFailure>,
}

impl SeriesReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of task `index`.
    ///
    /// A non-zero exit is always recorded; it aborts the series only when the
    /// task asked for it.
    pub fn record(&mut self, index: usize, exit_code: i64, abort_on_fail: bool) -> SeriesStep {
        if exit_code == 0 {
            return SeriesStep::Continue;
        }

        self.failures.push(TaskFailure { index, exit_code });

        if abort_on_fail {
            SeriesStep::Abort
        } else {
            SeriesStep::Continue
        }
    }

    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    /// Failures ordered by task index, regardless of recording order.
    pub fn into_failures(mut self) -> Vec<TaskFailure> {
        self.failures.sort_by_key(|f| f.index);
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_never_aborts() {
        let mut report = SeriesReport::new();
        assert_eq!(report.record(0, 0, true), SeriesStep::Continue);
        assert!(report.failures().is_empty());
    }

    #[test]
    fn failure_aborts_only_when_requested() {
        let mut report = SeriesReport::new();
        assert_eq!(report.record(1, 2, false), SeriesStep::Continue);
        assert_eq!(report.record(3, 1, true), SeriesStep::Abort);
        assert_eq!(
            report.into_failures(),
            vec![
                TaskFailure {
                    index: 1,
                    exit_code: 2
                },
                TaskFailure {
                    index: 3,
                    exit_code: 1
                },
            ]
        );
    }

    #[test]
    fn failures_come_out_sorted_by_index() {
        let mut report = SeriesReport::new();
        report.record(4, 1, false);
        report.record(0, 9, false);
        let indices: Vec<_> = report.into_failures().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 4]);
    }
}
