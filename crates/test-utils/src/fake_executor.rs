use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use docrun::errors::{DocrunError, Result};
use docrun::exec::{RunningService, StepExecutor, StepInvocation};

/// One step the fake executor was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedStep {
    pub task: String,
    pub step: usize,
    pub program: String,
    pub args: Vec<String>,
    pub workdir: PathBuf,
    pub long_running: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    executed: Vec<ExecutedStep>,
    exit_codes: HashMap<(String, usize), i32>,
    missing_programs: HashSet<String>,
    /// Steps that never finish on their own.
    hanging: HashSet<(String, usize)>,
    /// `None`: services run until terminated.
    service_exit: Option<i32>,
    terminations: usize,
}

/// A fake executor that:
/// - records every step it is asked to run, in order
/// - reports exit code 0 unless a code was scripted for that (task, step)
/// - hands out fake services for long-running steps
///
/// Clones share state, so keep one clone in the test and give another to
/// the resolver.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    state: Arc<Mutex<FakeState>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make step `step` of `task` exit with `code`.
    pub fn exit_code(self, task: &str, step: usize, code: i32) -> Self {
        self.state
            .lock()
            .unwrap()
            .exit_codes
            .insert((task.to_string(), step), code);
        self
    }

    /// Make spawning `program` fail as if it were not installed.
    pub fn missing_program(self, program: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .missing_programs
            .insert(program.to_string());
        self
    }

    /// Make step `step` of `task` run until the resolver gives up on it.
    pub fn hang_on(self, task: &str, step: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .hanging
            .insert((task.to_string(), step));
        self
    }

    /// Make services exit on their own with `code`.
    pub fn service_exits_with(self, code: i32) -> Self {
        self.state.lock().unwrap().service_exit = Some(code);
        self
    }

    pub fn executed(&self) -> Vec<ExecutedStep> {
        self.state.lock().unwrap().executed.clone()
    }

    /// `(task, step)` pairs in execution order.
    pub fn executed_steps(&self) -> Vec<(String, usize)> {
        self.executed()
            .into_iter()
            .map(|e| (e.task, e.step))
            .collect()
    }

    pub fn services_spawned(&self) -> usize {
        self.executed().iter().filter(|e| e.long_running).count()
    }

    pub fn terminations(&self) -> usize {
        self.state.lock().unwrap().terminations
    }

    fn record(&self, invocation: &StepInvocation) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let program = invocation.command.program.clone();

        if state.missing_programs.contains(&program) {
            return Err(DocrunError::SpawnFailed {
                task: invocation.task.clone(),
                step: invocation.step,
                program,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake: not installed"),
            });
        }

        state.executed.push(ExecutedStep {
            task: invocation.task.clone(),
            step: invocation.step,
            program,
            args: invocation.command.args.clone(),
            workdir: invocation.workdir.clone(),
            long_running: invocation.command.long_running,
        });
        Ok(())
    }
}

impl StepExecutor for FakeExecutor {
    fn run_step<'a>(
        &'a mut self,
        invocation: &'a StepInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            self.record(invocation)?;
            let key = (invocation.task.clone(), invocation.step);
            let (hangs, code) = {
                let state = self.state.lock().unwrap();
                (
                    state.hanging.contains(&key),
                    state.exit_codes.get(&key).copied().unwrap_or(0),
                )
            };
            if hangs {
                std::future::pending::<()>().await;
            }
            Ok(code)
        })
    }

    fn spawn_service<'a>(
        &'a mut self,
        invocation: &'a StepInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RunningService>>> + Send + 'a>> {
        Box::pin(async move {
            self.record(invocation)?;
            let exit = self.state.lock().unwrap().service_exit;
            let service: Box<dyn RunningService> = Box::new(FakeService {
                task: invocation.task.clone(),
                step: invocation.step,
                exit,
                state: Arc::clone(&self.state),
            });
            Ok(service)
        })
    }
}

/// Service handle that either exits with a scripted code or runs until
/// terminated.
pub struct FakeService {
    task: String,
    step: usize,
    exit: Option<i32>,
    state: Arc<Mutex<FakeState>>,
}

impl RunningService for FakeService {
    fn task(&self) -> &str {
        &self.task
    }

    fn step(&self) -> usize {
        self.step
    }

    fn id(&self) -> Option<u32> {
        None
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + '_>> {
        let exit = self.exit;
        Box::pin(async move {
            match exit {
                Some(code) => Ok(code),
                None => std::future::pending().await,
            }
        })
    }

    fn terminate(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            state.lock().unwrap().terminations += 1;
            Ok(())
        })
    }
}
