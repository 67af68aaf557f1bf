#![allow(dead_code)]

use seqexec::orchestrator::Orchestrator;
use seqexec::types::ExecutionMode;
use seqexec_test_utils::{FakeBackend, FakeExec};

pub use seqexec_test_utils::init_tracing;

pub const CONTAINER: &str = "8b86980c5770";

/// T1 exits 0, T2 exits 3, T3 exits 0.
pub fn three_step_backend() -> FakeBackend {
    FakeBackend::new()
        .with_container(CONTAINER)
        .script(&["step", "one"], FakeExec::exit(0).stdout("one\n"))
        .script(&["step", "two"], FakeExec::exit(3).stderr("two failed\n"))
        .script(&["step", "three"], FakeExec::exit(0).stdout("three\n"))
}

pub fn serial(backend: FakeBackend) -> Orchestrator<FakeBackend> {
    Orchestrator::new(backend, CONTAINER, ExecutionMode::Serial)
}

pub fn parallel(backend: FakeBackend) -> Orchestrator<FakeBackend> {
    Orchestrator::new(backend, CONTAINER, ExecutionMode::Parallel)
}
