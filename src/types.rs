// src/types.rs

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::task::Task;

/// How the orchestrator walks its task list.
///
/// - `Serial`: one task at a time, in insertion order, honouring
///   `abort_series_on_fail` (default).
/// - `Parallel`: every task starts at once with its own session and adapters.
///   There is no series to abort, so `abort_series_on_fail` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[serde(alias = "series")]
    Serial,
    Parallel,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Serial
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serial" | "series" => Ok(ExecutionMode::Serial),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(format!(
                "invalid mode: {other} (expected \"serial\" or \"parallel\")"
            )),
        }
    }
}

/// Lifecycle notifications emitted for every task that begins execution.
///
/// Always `Before → Executing → After`, once each. Tasks skipped by an abort
/// receive none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Before,
    Executing,
    After,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleState::Before => "before",
            LifecycleState::Executing => "executing",
            LifecycleState::After => "after",
        };
        f.write_str(s)
    }
}

/// Receives each output chunk and whether it came from stdout (`true`) or
/// stderr (`false`).
///
/// Invoked from a background reader task. It must not block for long: a slow
/// callback stalls that stream's reader loop.
pub type OutputCallback = Arc<dyn Fn(&[u8], bool) + Send + Sync>;

/// Receives lifecycle transitions together with the task they apply to.
pub type StateCallback = Arc<dyn Fn(LifecycleState, &Task) + Send + Sync>;
