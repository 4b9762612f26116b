// src/errors.rs

//! Crate-wide error type and exit-code mapping.

use std::path::PathBuf;

use thiserror::Error;

use crate::dag::TaskName;

/// Exit code used when the requested task does not exist.
pub const EXIT_TASK_NOT_FOUND: i32 = 2;
/// Exit code used for configuration and graph validation failures.
pub const EXIT_CONFIG: i32 = 3;
/// Exit code used when a step's program could not be started at all.
pub const EXIT_SPAWN_FAILED: i32 = 127;
/// Exit code used when a shutdown signal stops the build before it finished.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Error, Debug)]
pub enum DocrunError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("task '{task}' failed at step {step} with exit code {code}")]
    StepFailed {
        task: TaskName,
        step: usize,
        code: i32,
    },

    #[error("filesystem error at {path:?}: {source}")]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task '{task}' step {step}: could not start `{program}`: {source}")]
    SpawnFailed {
        task: TaskName,
        step: usize,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("interrupted while running task '{task}'")]
    Interrupted { task: TaskName },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DocrunError {
    /// Process exit code the binary reports for this error.
    ///
    /// A failing step propagates its own code; codes outside `1..=255`
    /// (e.g. `-1` for "no code available") collapse to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            DocrunError::StepFailed { code, .. } if (1..=255).contains(code) => *code,
            DocrunError::StepFailed { .. } => 1,
            DocrunError::TaskNotFound(_) => EXIT_TASK_NOT_FOUND,
            DocrunError::ConfigError(_) | DocrunError::DagCycle(_) | DocrunError::TomlError(_) => {
                EXIT_CONFIG
            }
            DocrunError::SpawnFailed { .. } => EXIT_SPAWN_FAILED,
            DocrunError::Interrupted { .. } => EXIT_INTERRUPTED,
            DocrunError::FilesystemError { .. }
            | DocrunError::IoError(_)
            | DocrunError::Other(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocrunError>;
