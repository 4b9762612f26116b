// src/engine/resolver.rs

use std::fmt;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dag::{CommandSpec, ExecutionPlan, Step, TaskDef, TaskGraph, TaskName};
use crate::errors::{DocrunError, Result};
use crate::exec::{RunningService, StepExecutor, StepInvocation};
use crate::fs::FileSystem;

/// Lifecycle of one execution request.
///
/// `Pending → ResolvingDependencies → ExecutingSteps → Completed | Failed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Pending,
    ResolvingDependencies,
    ExecutingSteps { task: TaskName },
    Completed,
    Failed,
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolutionState::Completed | ResolutionState::Failed)
    }
}

/// Successful result of a resolution.
pub enum Resolution {
    /// Every planned step ran and exited 0.
    Completed,
    /// Every finite step succeeded and the target's final long-running step
    /// was started; the caller now owns the running service.
    Serving(Box<dyn RunningService>),
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Completed => f.write_str("Completed"),
            Resolution::Serving(service) => f
                .debug_struct("Serving")
                .field("task", &service.task())
                .field("step", &service.step())
                .field("pid", &service.id())
                .finish(),
        }
    }
}

/// Runs a requested task and its transitive dependencies, in order, one
/// step at a time, stopping at the first failure.
///
/// Nothing is rolled back on failure: directories and files produced by
/// earlier steps stay where they are.
///
/// Once the cancellation token fires, the running step is dropped (its
/// process is killed) and resolution fails with `Interrupted`.
pub struct Resolver<'g, E, F> {
    graph: &'g TaskGraph,
    executor: E,
    fs: F,
    /// Project root; relative step paths are resolved against it.
    root: PathBuf,
    cancel: CancellationToken,
    state: ResolutionState,
}

impl<'g, E, F> Resolver<'g, E, F>
where
    E: StepExecutor,
    F: FileSystem,
{
    pub fn new(graph: &'g TaskGraph, executor: E, fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            graph,
            executor,
            fs,
            root: root.into(),
            cancel: CancellationToken::new(),
            state: ResolutionState::Pending,
        }
    }

    /// Stop between or during steps once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    /// Resolve and execute `target`.
    ///
    /// Errors:
    /// - `TaskNotFound` if `target` is not in the graph (no step runs)
    /// - `StepFailed` for the first step exiting non-zero
    /// - `SpawnFailed` if a step's program cannot be started
    /// - `FilesystemError` if a directory step fails
    /// - `Interrupted` if the cancellation token fires first
    pub async fn resolve(&mut self, target: &str) -> Result<Resolution> {
        self.set_state(ResolutionState::Pending);

        let result = self.resolve_inner(target).await;

        match &result {
            Ok(_) => self.set_state(ResolutionState::Completed),
            Err(err) => {
                error!(target = %target, error = %err, "resolution failed");
                self.set_state(ResolutionState::Failed);
            }
        }

        result
    }

    async fn resolve_inner(&mut self, target: &str) -> Result<Resolution> {
        self.set_state(ResolutionState::ResolvingDependencies);

        let graph = self.graph;
        let plan = ExecutionPlan::resolve(graph, target)?;

        info!(
            target = %target,
            tasks = ?plan.order(),
            steps = plan.step_count(graph),
            "executing plan"
        );

        for task in plan.tasks(graph) {
            self.set_state(ResolutionState::ExecutingSteps {
                task: task.name.clone(),
            });

            if let Some(service) = self.run_task(task).await? {
                return Ok(Resolution::Serving(service));
            }
        }

        Ok(Resolution::Completed)
    }

    /// Run one task's steps. Returns the service handle if the task ended
    /// in a long-running step.
    async fn run_task(&mut self, task: &TaskDef) -> Result<Option<Box<dyn RunningService>>> {
        info!(task = %task.name, steps = task.steps.len(), "task started");

        for (index, step) in task.steps.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(self.interrupted(task, index));
            }
            match step {
                Step::EnsureDir(path) => self.ensure_dir(task, index, path)?,
                Step::Exec(cmd) if cmd.long_running => {
                    let invocation = self.invocation(task, index, cmd);
                    let service = self.executor.spawn_service(&invocation).await?;
                    info!(task = %task.name, "task handed off long-running step");
                    return Ok(Some(service));
                }
                Step::Exec(cmd) => {
                    let invocation = self.invocation(task, index, cmd);
                    let code = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => {
                            return Err(self.interrupted(task, index));
                        }
                        code = self.executor.run_step(&invocation) => code?,
                    };
                    if code != 0 {
                        return Err(DocrunError::StepFailed {
                            task: task.name.clone(),
                            step: index,
                            code,
                        });
                    }
                }
            }
        }

        info!(task = %task.name, "task finished");
        Ok(None)
    }

    fn interrupted(&self, task: &TaskDef, index: usize) -> DocrunError {
        warn!(task = %task.name, step = index, "shutdown requested; abandoning step");
        DocrunError::Interrupted {
            task: task.name.clone(),
        }
    }

    fn ensure_dir(&self, task: &TaskDef, index: usize, path: &Path) -> Result<()> {
        let full = self.root.join(path);
        debug!(
            task = %task.name,
            step = index,
            path = %full.display(),
            already_present = self.fs.is_dir(&full),
            "ensuring directory exists"
        );
        self.fs
            .create_dir_all(&full)
            .map_err(|source| DocrunError::FilesystemError { path: full, source })
    }

    fn invocation(&self, task: &TaskDef, index: usize, cmd: &CommandSpec) -> StepInvocation {
        let workdir = match &cmd.cwd {
            Some(cwd) => self.root.join(cwd),
            None => self.root.clone(),
        };
        StepInvocation {
            task: task.name.clone(),
            step: index,
            command: cmd.clone(),
            workdir,
        }
    }

    fn set_state(&mut self, next: ResolutionState) {
        debug!(from = ?self.state, to = ?next, "resolution state");
        self.state = next;
    }
}
