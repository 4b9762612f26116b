// src/exec/service.rs

//! Handle for a long-running step process (e.g. the static file server).

use std::future::Future;
use std::pin::Pin;

#[cfg(unix)]
use std::process::Stdio;

#[cfg(unix)]
use tokio::process::Command;
use tokio::process::Child;
use tracing::{debug, info};
#[cfg(unix)]
use tracing::warn;

use crate::dag::TaskName;
use crate::errors::Result;
use crate::exec::backend::RunningService;
use crate::exec::command::exit_code;

pub struct ProcessService {
    task: TaskName,
    step: usize,
    child: Child,
}

impl ProcessService {
    pub fn new(task: TaskName, step: usize, child: Child) -> Self {
        Self { task, step, child }
    }
}

impl RunningService for ProcessService {
    fn task(&self) -> &str {
        &self.task
    }

    fn step(&self) -> usize {
        self.step
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + '_>> {
        Box::pin(async move {
            let status = self.child.wait().await?;
            let code = exit_code(status);
            info!(task = %self.task, step = self.step, exit_code = code, "service exited");
            Ok(code)
        })
    }

    fn terminate(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if let Some(status) = self.child.try_wait()? {
                debug!(
                    task = %self.task,
                    exit_code = exit_code(status),
                    "service already exited; nothing to terminate"
                );
                return Ok(());
            }

            info!(task = %self.task, pid = self.child.id(), "terminating service");
            #[cfg(unix)]
            {
                if let Some(pgid) = self.child.id() {
                    kill_process_group(pgid).await;
                }
            }
            // SIGKILL the child itself and reap it, so no zombie is left behind.
            self.child.kill().await?;
            Ok(())
        })
    }
}

/// `kill -KILL -- -<pgid>`. Best effort: the direct child is killed
/// separately either way.
#[cfg(unix)]
async fn kill_process_group(pgid: u32) {
    let status = Command::new("kill")
        .args(["-KILL", "--", &format!("-{pgid}")])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => debug!(pgid, "process group killed"),
        Ok(status) => debug!(pgid, code = status.code(), "kill on process group failed"),
        Err(e) => warn!(pgid, error = %e, "could not run `kill` for process group"),
    }
}
