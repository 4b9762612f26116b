// src/exec/command.rs

use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{DocrunError, Result};
use crate::exec::backend::{RunningService, StepExecutor, StepInvocation};
use crate::exec::service::ProcessService;

/// Executor that runs steps as real OS processes.
///
/// Child stdio is inherited so collaborator output and diagnostics reach the
/// user unchanged.
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl StepExecutor for RealExecutor {
    fn run_step<'a>(
        &'a mut self,
        invocation: &'a StepInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            let mut child = build_command(invocation)
                .spawn()
                .map_err(|source| spawn_error(invocation, source))?;

            debug!(
                task = %invocation.task,
                step = invocation.step,
                pid = child.id(),
                "step process spawned"
            );

            let status = child.wait().await?;
            let code = exit_code(status);

            info!(
                task = %invocation.task,
                step = invocation.step,
                exit_code = code,
                success = status.success(),
                "step process exited"
            );

            Ok(code)
        })
    }

    fn spawn_service<'a>(
        &'a mut self,
        invocation: &'a StepInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RunningService>>> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = build_command(invocation);
            // Own process group, so terminating the service also reaches
            // anything it started (e.g. the server behind a `sh -c`).
            #[cfg(unix)]
            {
                cmd.process_group(0);
            }

            let child = cmd
                .spawn()
                .map_err(|source| spawn_error(invocation, source))?;

            info!(
                task = %invocation.task,
                step = invocation.step,
                pid = child.id(),
                workdir = %invocation.workdir.display(),
                "long-running step started"
            );

            let service: Box<dyn RunningService> = Box::new(ProcessService::new(
                invocation.task.clone(),
                invocation.step,
                child,
            ));
            Ok(service)
        })
    }
}

fn build_command(invocation: &StepInvocation) -> Command {
    let spec = &invocation.command;

    info!(
        task = %invocation.task,
        step = invocation.step,
        cmd = %spec,
        workdir = %invocation.workdir.display(),
        "starting step"
    );

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(&spec.env)
        .current_dir(&invocation.workdir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    cmd
}

fn spawn_error(invocation: &StepInvocation, source: std::io::Error) -> DocrunError {
    DocrunError::SpawnFailed {
        task: invocation.task.clone(),
        step: invocation.step,
        program: invocation.command.program.clone(),
        source,
    }
}

/// Exit code of a finished process.
///
/// On unix a process killed by a signal reports `128 + signal`, the shell
/// convention. `-1` when neither is available.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
