// tests/config_loading.rs

mod common;
use crate::common::{CONTAINER, init_tracing};

use std::io::Write;

use tempfile::NamedTempFile;

use seqexec::build_orchestrator;
use seqexec::config::load_and_validate;
use seqexec::errors::SeqexecError;
use seqexec::types::ExecutionMode;
use seqexec_test_utils::builders::{SeriesFileBuilder, TaskConfigBuilder};
use seqexec_test_utils::{FakeBackend, FakeExec, with_timeout};

#[test]
fn series_file_round_trips_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[run]
container = "web-1"
mode = "parallel"
privileged = true
docker_host = "unix:///var/run/docker.sock"
stream_output = false

[[task]]
cmd = ["apt-get", "update"]
abort_series_on_fail = true

[[task]]
cmd = ["sh", "-c", "echo hello"]
keep_output = true
"#
    )
    .unwrap();

    let series = load_and_validate(file.path()).unwrap();

    assert_eq!(series.run.container.as_deref(), Some("web-1"));
    assert_eq!(series.run.mode, ExecutionMode::Parallel);
    assert!(series.run.privileged);
    assert!(!series.run.stream_output);
    assert_eq!(series.task.len(), 2);

    let tasks = series.to_tasks();
    assert_eq!(tasks[0].command(), ["apt-get", "update"]);
    assert!(tasks[0].aborts_series_on_fail());
    assert!(tasks[1].keeps_output());
    assert!(!tasks[1].is_done());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/Seqexec.toml").unwrap_err();
    assert!(matches!(err, SeqexecError::IoError(_)));
}

#[test]
fn file_without_tasks_is_a_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[run]\ncontainer = \"web-1\"\n").unwrap();

    match load_and_validate(file.path()) {
        Err(SeqexecError::ConfigError(msg)) => assert!(msg.contains("[[task]]")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[tokio::test]
async fn orchestrator_built_from_series_runs_its_tasks() {
    init_tracing();

    let series = SeriesFileBuilder::new()
        .container(CONTAINER)
        .privileged(true)
        .stream_output(false)
        .with_task(TaskConfigBuilder::new(&["prepare"]).build())
        .with_task(
            TaskConfigBuilder::new(&["migrate"])
                .abort_series_on_fail(true)
                .build(),
        )
        .with_task(TaskConfigBuilder::new(&["serve"]).keep_output(true).build())
        .build();

    let backend = FakeBackend::new()
        .with_container(CONTAINER)
        .script(&["migrate"], FakeExec::exit(1).stderr("locked\n"));

    let mut orch = build_orchestrator(
        backend,
        &series,
        CONTAINER.to_string(),
        series.run.mode,
    );
    assert_eq!(orch.tasks().len(), 3);
    assert_eq!(orch.mode(), ExecutionMode::Serial);
    assert_eq!(orch.container_id(), CONTAINER);

    let failures = with_timeout(orch.run()).await.unwrap();

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 1);
    assert!(!orch.tasks()[2].is_done());
    // No output destination: stream_output is off and nothing is kept.
    let requests = orch.backend().requests();
    assert!(!requests[0].attach_stdout);
    assert!(requests.iter().all(|r| r.privileged));
}
