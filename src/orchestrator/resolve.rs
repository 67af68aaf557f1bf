// src/orchestrator/resolve.rs

//! Merge orchestrator-wide defaults with per-task settings.

use crate::task::Task;
use crate::types::OutputCallback;

/// Orchestrator-wide fallbacks for task settings.
#[derive(Clone, Default)]
pub struct TaskDefaults {
    pub privileged: bool,
    pub output_callback: Option<OutputCallback>,
}

/// The settings a task actually runs with.
#[derive(Clone)]
pub struct EffectiveTaskConfig {
    pub output_callback: Option<OutputCallback>,
    pub privileged: bool,
    pub keep_output: bool,
    /// Whether the session should attach stdout/stderr at all.
    pub attach: bool,
}

/// Task value if set, else the orchestrator default, else absent.
///
/// `privileged` is a plain flag on the task, so only `true` counts as set.
pub fn resolve(task: &Task, defaults: &TaskDefaults) -> EffectiveTaskConfig {
    let output_callback = task
        .callback()
        .cloned()
        .or_else(|| defaults.output_callback.clone());
    let privileged = task.is_privileged() || defaults.privileged;
    let keep_output = task.keeps_output();
    let attach = output_callback.is_some() || keep_output;

    EffectiveTaskConfig {
        output_callback,
        privileged,
        keep_output,
        attach,
    }
}
