// src/engine/supervisor.rs

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{DocrunError, Result};
use crate::exec::RunningService;

/// Exit code a process reports when it dies from SIGINT (`128 + 2`).
const SIGINT_EXIT_CODE: i32 = 130;

/// How a supervised service ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// The service exited 0 on its own.
    Exited,
    /// An interrupt arrived; the service was stopped.
    Interrupted,
}

/// Block until the service exits or `cancel` fires.
///
/// - cancellation: the service is terminated and reaped → `Interrupted`
/// - exit code 0 → `Exited`
/// - any other exit (e.g. the port is already bound) → `StepFailed`
///
/// A terminal Ctrl-C reaches the child too, so a child that dies with
/// SIGINT, or exits while cancellation is already requested, also counts as
/// interrupted.
pub async fn supervise(
    mut service: Box<dyn RunningService>,
    cancel: CancellationToken,
) -> Result<ServeOutcome> {
    info!(
        task = %service.task(),
        pid = service.id(),
        "serving; press Ctrl-C to stop"
    );

    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            warn!(task = %service.task(), "interrupt received; stopping service");
            service.terminate().await?;
            Ok(ServeOutcome::Interrupted)
        }

        exited = service.wait() => {
            let code = exited?;
            if cancel.is_cancelled() || code == SIGINT_EXIT_CODE {
                info!(task = %service.task(), exit_code = code, "service stopped by interrupt");
                Ok(ServeOutcome::Interrupted)
            } else if code == 0 {
                Ok(ServeOutcome::Exited)
            } else {
                warn!(
                    task = %service.task(),
                    step = service.step(),
                    exit_code = code,
                    "service exited with failure"
                );
                Err(DocrunError::StepFailed {
                    task: service.task().to_string(),
                    step: service.step(),
                    code,
                })
            }
        }
    }
}
