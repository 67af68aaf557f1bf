// tests/session_requests.rs

mod common;
use crate::common::{CONTAINER, init_tracing, serial};

use seqexec::backend::SessionRequest;
use seqexec::task::Task;
use seqexec_test_utils::{FakeBackend, FakeExec, OutputRecorder, with_timeout};

fn backend() -> FakeBackend {
    FakeBackend::new()
        .with_container(CONTAINER)
        .script(&["talk"], FakeExec::exit(0).stdout("out").stderr("err"))
}

fn request_for(requests: &[SessionRequest], program: &str) -> SessionRequest {
    requests
        .iter()
        .find(|r| r.command[0] == program)
        .cloned()
        .unwrap_or_else(|| panic!("no session request for {program}"))
}

#[tokio::test]
async fn requests_target_the_container_with_the_command() {
    init_tracing();

    let mut orch = serial(backend());
    orch.add(Task::new(["sh", "-c", "echo hi"]));
    with_timeout(orch.run()).await.unwrap();

    let requests = orch.backend().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].container_id, CONTAINER);
    assert_eq!(requests[0].command, vec!["sh", "-c", "echo hi"]);
}

#[tokio::test]
async fn attachment_follows_output_destinations() {
    init_tracing();

    let output = OutputRecorder::new();
    let mut orch = serial(backend());
    orch.add_all([
        Task::new(["silent"]),
        Task::new(["kept"]).keep_output(true),
        Task::new(["watched"]).output_callback(output.callback()),
    ]);
    with_timeout(orch.run()).await.unwrap();

    let requests = orch.backend().requests();
    let silent = request_for(&requests, "silent");
    assert!(!silent.attach_stdout && !silent.attach_stderr);
    let kept = request_for(&requests, "kept");
    assert!(kept.attach_stdout && kept.attach_stderr);
    let watched = request_for(&requests, "watched");
    assert!(watched.attach_stdout && watched.attach_stderr);
}

#[tokio::test]
async fn default_output_callback_attaches_every_task() {
    init_tracing();

    let output = OutputRecorder::new();
    let mut orch = serial(backend()).with_default_output(output.callback());
    orch.add_all([Task::new(["a"]), Task::new(["b"])]);
    with_timeout(orch.run()).await.unwrap();

    assert!(
        orch.backend()
            .requests()
            .iter()
            .all(|r| r.attach_stdout && r.attach_stderr)
    );
}

#[tokio::test]
async fn privilege_is_task_flag_or_orchestrator_default() {
    init_tracing();

    let mut plain = serial(backend());
    plain.add_all([Task::new(["user"]), Task::new(["root"]).privileged(true)]);
    with_timeout(plain.run()).await.unwrap();

    let requests = plain.backend().requests();
    assert!(!request_for(&requests, "user").privileged);
    assert!(request_for(&requests, "root").privileged);

    let mut elevated = serial(backend()).with_default_privileged(true);
    elevated.add_all([Task::new(["user"]), Task::new(["root"]).privileged(true)]);
    with_timeout(elevated.run()).await.unwrap();

    assert!(elevated.backend().requests().iter().all(|r| r.privileged));
}

#[tokio::test]
async fn task_callback_wins_over_default_and_streams_are_tagged() {
    init_tracing();

    let default_output = OutputRecorder::new();
    let task_output = OutputRecorder::new();
    let mut orch = serial(backend()).with_default_output(default_output.callback());
    orch.add(Task::new(["talk"]).output_callback(task_output.callback()));
    with_timeout(orch.run()).await.unwrap();

    assert_eq!(task_output.stdout(), b"out");
    assert_eq!(task_output.stderr(), b"err");
    assert!(default_output.stdout().is_empty());
    assert!(default_output.stderr().is_empty());
}
