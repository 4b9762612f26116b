// src/dag/task.rs

//! Task and step definitions shared by the graph, the resolver and the
//! executors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Tasks are identified by name everywhere in the crate.
pub type TaskName = String;

/// A single external command invocation.
///
/// `cwd` is relative to the project root (absolute paths are used as-is);
/// `None` means "run in the project root".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    /// The process is expected to run until interrupted (e.g. a file server).
    pub long_running: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            long_running: false,
        }
    }

    /// Build a command from an argv vector. Returns `None` for an empty argv.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let program = iter.next()?;
        Some(Self::new(program).args(iter))
    }

    /// Wrap a shell string the way a user would type it in a terminal.
    pub fn shell(script: &str) -> Self {
        if cfg!(windows) {
            Self::new("cmd").args(["/C", script])
        } else {
            Self::new("sh").args(["-c", script])
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn long_running(mut self, long_running: bool) -> Self {
        self.long_running = long_running;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {:?}", arg)?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What a step does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run an external program.
    Exec(CommandSpec),
    /// Create a directory (and missing parents) relative to the project root.
    /// Succeeds when the directory already exists.
    EnsureDir(PathBuf),
}

impl Step {
    pub fn is_long_running(&self) -> bool {
        matches!(self, Step::Exec(cmd) if cmd.long_running)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Exec(cmd) => write!(f, "{cmd}"),
            Step::EnsureDir(path) => write!(f, "mkdir -p {}", path.display()),
        }
    }
}

/// A named, ordered sequence of steps plus its prerequisite tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDef {
    pub name: TaskName,
    pub description: Option<String>,
    /// Direct dependencies, in declaration order.
    pub deps: Vec<TaskName>,
    pub steps: Vec<Step>,
}

impl TaskDef {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            description: None,
            deps: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.deps.push(dep.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Whether any step of this task keeps running until interrupted.
    pub fn has_long_running_step(&self) -> bool {
        self.steps.iter().any(Step::is_long_running)
    }
}
