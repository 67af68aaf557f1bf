use std::sync::{Arc, Mutex};

use seqexec::task::Task;
use seqexec::types::{LifecycleState, OutputCallback, StateCallback};

/// Collects lifecycle transitions as `(command line, state)` pairs.
#[derive(Debug, Clone, Default)]
pub struct StateRecorder {
    events: Arc<Mutex<Vec<(String, LifecycleState)>>>,
}

impl StateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> StateCallback {
        let events = Arc::clone(&self.events);
        Arc::new(move |state: LifecycleState, task: &Task| {
            events
                .lock()
                .unwrap()
                .push((task.display_command(), state));
        })
    }

    pub fn events(&self) -> Vec<(String, LifecycleState)> {
        self.events.lock().unwrap().clone()
    }

    /// States seen for one command line, in order.
    pub fn states_for(&self, command: &str) -> Vec<LifecycleState> {
        self.events()
            .into_iter()
            .filter(|(cmd, _)| cmd == command)
            .map(|(_, state)| state)
            .collect()
    }
}

/// Collects output chunks per stream.
#[derive(Debug, Clone, Default)]
pub struct OutputRecorder {
    stdout: Arc<Mutex<Vec<u8>>>,
    stderr: Arc<Mutex<Vec<u8>>>,
}

impl OutputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> OutputCallback {
        let stdout = Arc::clone(&self.stdout);
        let stderr = Arc::clone(&self.stderr);
        Arc::new(move |chunk: &[u8], is_stdout: bool| {
            let target = if is_stdout { &stdout } else { &stderr };
            target.lock().unwrap().extend_from_slice(chunk);
        })
    }

    pub fn stdout(&self) -> Vec<u8> {
        self.stdout.lock().unwrap().clone()
    }

    pub fn stderr(&self) -> Vec<u8> {
        self.stderr.lock().unwrap().clone()
    }
}
