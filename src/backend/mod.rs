// src/backend/mod.rs

//! Pluggable execution backend abstraction.
//!
//! The orchestrator talks to an [`ExecBackend`] instead of a concrete
//! container client. Production uses [`DockerBackend`]; tests provide a
//! scripted fake that never touches a daemon.
//!
//! The binding is deliberately thin: it translates requests, hands back raw
//! outcomes and performs no retry or interpretation. Classifying failures is
//! the orchestrator's job.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::stream::StreamSink;

pub mod docker;

pub use docker::DockerBackend;

/// Boxed future returned by backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Everything needed to create one exec session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub container_id: String,
    pub command: Vec<String>,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub privileged: bool,
}

/// Opaque identifier of a created exec session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    pub id: String,
}

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Trait abstracting how commands are executed inside a container.
pub trait ExecBackend: Send + Sync {
    /// Fail unless the container exists and is running.
    fn inspect_container<'a>(&'a self, container_id: &'a str) -> BackendFuture<'a, ()>;

    /// Create (but do not start) an exec session.
    fn create_session<'a>(&'a self, request: SessionRequest) -> BackendFuture<'a, SessionHandle>;

    /// Start the session and drive it to completion, writing its output into
    /// the given sinks.
    ///
    /// Implementations must drop both sinks before resolving; that is what
    /// closes the adapters' streams.
    fn start_session<'a>(
        &'a self,
        session: &'a SessionHandle,
        stdout: StreamSink,
        stderr: StreamSink,
    ) -> BackendFuture<'a, ()>;

    /// Exit code of a finished session.
    fn inspect_session<'a>(&'a self, session: &'a SessionHandle) -> BackendFuture<'a, i64>;
}
