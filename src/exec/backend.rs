// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The resolver talks to a `StepExecutor` instead of spawning processes
//! itself. Production code uses [`RealExecutor`](super::RealExecutor); tests
//! swap in a fake that records invocations and returns scripted exit codes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::dag::{CommandSpec, TaskName};
use crate::errors::Result;

/// A command step, ready to run: which task/step it belongs to plus the
/// fully resolved working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInvocation {
    pub task: TaskName,
    /// Zero-based index of the step within its task.
    pub step: usize,
    pub command: CommandSpec,
    pub workdir: PathBuf,
}

/// Trait abstracting how command steps are executed.
pub trait StepExecutor: Send {
    /// Run a finite step to completion and return its exit code.
    ///
    /// A non-zero code is *not* an error here; the resolver decides what a
    /// failing code means. Errors are reserved for "could not run at all".
    fn run_step<'a>(
        &'a mut self,
        invocation: &'a StepInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>>;

    /// Start a long-running step and hand back its handle without waiting.
    fn spawn_service<'a>(
        &'a mut self,
        invocation: &'a StepInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RunningService>>> + Send + 'a>>;
}

/// Handle to a long-running step's process.
pub trait RunningService: Send {
    fn task(&self) -> &str;

    fn step(&self) -> usize;

    /// OS process id, if the backend has one.
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit on its own and return its exit code.
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + '_>>;

    /// Stop the process and reap it. Idempotent.
    fn terminate(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
