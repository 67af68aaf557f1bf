// tests/run_report.rs

mod common;
use crate::common::{CONTAINER, init_tracing, serial};

use seqexec::errors::SeqexecError;
use seqexec::run_and_report;
use seqexec::task::Task;
use seqexec_test_utils::{FakeBackend, FakeExec, with_timeout};

#[tokio::test]
async fn kept_output_is_written_when_the_run_stops_on_infrastructure_error() {
    init_tracing();

    let backend = FakeBackend::new()
        .with_container(CONTAINER)
        .script(&["build"], FakeExec::exit(0).stdout("built ok\n"))
        .script(&["deploy"], FakeExec::exit(0).fail_create());
    let mut orch = serial(backend);
    orch.add_all([
        Task::new(["build"]).keep_output(true),
        Task::new(["deploy"]).keep_output(true),
    ]);

    let mut out = Vec::new();
    let err = with_timeout(run_and_report(&mut orch, &mut out))
        .await
        .unwrap_err();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("--- output of task 0 (build) ---"), "{printed}");
    assert!(printed.contains("built ok\n"), "{printed}");
    // The task that never ran has nothing to show.
    assert!(!printed.contains("task 1"), "{printed}");

    assert!(matches!(
        err.downcast_ref::<SeqexecError>(),
        Some(SeqexecError::SessionCreate { index: 1, .. })
    ));
}

#[tokio::test]
async fn non_zero_exit_fails_after_writing_output() {
    init_tracing();

    let backend = FakeBackend::new()
        .with_container(CONTAINER)
        .script(&["check"], FakeExec::exit(2).stdout("2 problems\n"));
    let mut orch = serial(backend);
    orch.add(Task::new(["check"]).keep_output(true));

    let mut out = Vec::new();
    let err = with_timeout(run_and_report(&mut orch, &mut out))
        .await
        .unwrap_err();

    assert!(String::from_utf8_lossy(&out).contains("2 problems"));
    assert_eq!(err.to_string(), "1 of 1 task(s) failed");
}

#[tokio::test]
async fn successful_run_without_kept_output_writes_nothing() {
    init_tracing();

    let mut orch = serial(FakeBackend::new().with_container(CONTAINER));
    orch.add(Task::new(["true"]));

    let mut out = Vec::new();
    with_timeout(run_and_report(&mut orch, &mut out))
        .await
        .unwrap();

    assert!(out.is_empty());
}
