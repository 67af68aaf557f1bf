// src/lib.rs

pub mod backend;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod orchestrator;
pub mod stream;
pub mod task;
pub mod types;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::backend::{DockerBackend, ExecBackend};
use crate::cli::CliArgs;
use crate::config::SeriesFile;
use crate::config::loader::load_and_validate;
use crate::orchestrator::Orchestrator;
use crate::types::{ExecutionMode, LifecycleState, OutputCallback, StateCallback};

pub use crate::errors::{SeqexecError, TaskFailure};
pub use crate::task::Task;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - series file loading and CLI overrides
/// - the Docker backend
/// - the orchestrator with stdout/stderr streaming
///
/// Returns an error for run-level faults and when any task exits non-zero.
pub async fn run(args: CliArgs) -> Result<()> {
    let series = load_and_validate(&args.config)
        .with_context(|| format!("loading series file {}", args.config))?;

    let container = args
        .container
        .clone()
        .or_else(|| series.run.container.clone())
        .ok_or_else(|| anyhow!("no container given: set [run].container or pass --container"))?;

    let mode = if args.parallel {
        ExecutionMode::Parallel
    } else {
        series.run.mode
    };

    if args.dry_run {
        print_dry_run(&series, &container, mode);
        return Ok(());
    }

    let docker_host = args
        .docker_host
        .as_deref()
        .or(series.run.docker_host.as_deref());
    let backend = DockerBackend::connect(docker_host)?;

    let mut orchestrator = build_orchestrator(backend, &series, container, mode);
    run_and_report(&mut orchestrator, &mut std::io::stdout()).await
}

/// Run `orchestrator`, then write the output of every finished task that
/// asked to keep it to `out`.
///
/// Kept output is written even when the run stops on an infrastructure
/// error, so tasks that completed before the fault are not lost. Fails on
/// that error, or when any task exited non-zero.
pub async fn run_and_report<B: ExecBackend>(
    orchestrator: &mut Orchestrator<B>,
    out: &mut impl Write,
) -> Result<()> {
    let outcome = orchestrator.run().await;

    let written = write_kept_output(orchestrator.tasks(), out);

    let failures = outcome?;
    written.context("writing kept task output")?;
    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{failure}");
        }
        bail!("{} of {} task(s) failed", failures.len(), orchestrator.tasks().len());
    }

    info!("all tasks succeeded");
    Ok(())
}

/// Orchestrator configured from a series file: defaults, terminal streaming
/// (when `stream_output` is set), lifecycle logging and the file's tasks.
pub fn build_orchestrator<B: ExecBackend>(
    backend: B,
    series: &SeriesFile,
    container: String,
    mode: ExecutionMode,
) -> Orchestrator<B> {
    let mut orchestrator =
        Orchestrator::new(backend, container, mode).with_default_privileged(series.run.privileged);

    if series.run.stream_output {
        orchestrator = orchestrator.with_default_output(terminal_output());
    }

    let log_state: StateCallback = Arc::new(|state: LifecycleState, task: &Task| {
        debug!(%state, cmd = %task.display_command(), exit_code = ?task.exit_code(), "lifecycle");
    });
    orchestrator.set_state_callback(log_state);
    orchestrator.add_all(series.to_tasks());
    orchestrator
}

/// Forward chunks to this process' stdout or stderr.
fn terminal_output() -> OutputCallback {
    Arc::new(|chunk: &[u8], is_stdout: bool| {
        let written = if is_stdout {
            let mut out = std::io::stdout().lock();
            out.write_all(chunk).and_then(|_| out.flush())
        } else {
            let mut err = std::io::stderr().lock();
            err.write_all(chunk).and_then(|_| err.flush())
        };
        if let Err(e) = written {
            debug!(error = %e, "could not forward task output to terminal");
        }
    })
}

fn write_kept_output(tasks: &[Task], out: &mut impl Write) -> std::io::Result<()> {
    for (index, task) in tasks.iter().enumerate() {
        if !task.keeps_output() || !task.is_done() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "--- output of task {index} ({}) ---", task.display_command())?;
        out.write_all(&task.captured_output())?;
    }
    out.flush()
}

/// Simple dry-run output: print the resolved plan.
fn print_dry_run(series: &SeriesFile, container: &str, mode: ExecutionMode) {
    println!("seqexec dry-run");
    println!("  container = {container}");
    println!("  mode = {mode:?}");
    println!("  privileged = {}", series.run.privileged);
    println!("  stream_output = {}", series.run.stream_output);
    println!();

    println!("tasks ({}):", series.task.len());
    for (index, task) in series.task.iter().enumerate() {
        println!("  - [{index}] {}", task.cmd.join(" "));
        if task.abort_series_on_fail {
            println!("      abort_series_on_fail: true");
        }
        if task.privileged {
            println!("      privileged: true");
        }
        if task.keep_output {
            println!("      keep_output: true");
        }
    }

    debug!("dry-run complete (no execution)");
}
