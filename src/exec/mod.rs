// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs command steps with `tokio::process::Command`:
//!
//! - [`backend`] provides the `StepExecutor` / `RunningService` traits the
//!   resolver is written against, so tests can swap in fakes.
//! - [`command`] is the real, process-spawning executor.
//! - [`service`] wraps the child process of a long-running step.

pub mod backend;
pub mod command;
pub mod service;

pub use backend::{RunningService, StepExecutor, StepInvocation};
pub use command::{RealExecutor, exit_code};
pub use service::ProcessService;
