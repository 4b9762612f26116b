// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{ConfigFile, PipelineSection, RawConfigFile, StepConfig, TaskConfig};
use crate::dag::{CommandSpec, Step, TaskDef};
use crate::errors::{DocrunError, Result};
use crate::pipeline::{DOC_TASK, SERVE_TASK};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = DocrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.pipeline, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_pipeline(&cfg.pipeline)?;
    for (name, task) in cfg.task.iter() {
        validate_task(name, task)?;
    }
    Ok(())
}

/// Check the `[pipeline]` section on its own.
///
/// Also used after CLI overrides are applied to an already-validated config.
pub fn validate_pipeline(p: &PipelineSection) -> Result<()> {
    for (key, argv) in [
        ("generator", &p.generator),
        ("renderer", &p.renderer),
        ("server", &p.server),
    ] {
        if argv.first().is_none_or(|program| program.trim().is_empty()) {
            return Err(DocrunError::ConfigError(format!(
                "[pipeline].{key} must name a program"
            )));
        }
    }

    for (key, value) in [
        ("build_root", &p.build_root),
        ("doc_dir", &p.doc_dir),
        ("overview", &p.overview),
        ("rendered_name", &p.rendered_name),
    ] {
        if value.trim().is_empty() {
            return Err(DocrunError::ConfigError(format!(
                "[pipeline].{key} must not be empty"
            )));
        }
    }

    if p.port == 0 {
        return Err(DocrunError::ConfigError(
            "[pipeline].port must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(toolchain) = &p.toolchain {
        if toolchain.trim().is_empty() {
            return Err(DocrunError::ConfigError(
                "[pipeline].toolchain must not be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_task(name: &str, task: &TaskConfig) -> Result<()> {
    if name == DOC_TASK || name == SERVE_TASK {
        return Err(DocrunError::ConfigError(format!(
            "task name '{name}' is reserved for the built-in pipeline"
        )));
    }
    task_def_from_config(name, task).map(|_| ())
}

/// Convert a `[task.<name>]` section into a [`TaskDef`].
pub(crate) fn task_def_from_config(name: &str, task: &TaskConfig) -> Result<TaskDef> {
    let mut def = TaskDef::new(name);
    def.description = task.description.clone();
    def.deps = task.after.clone();
    for (index, step) in task.steps.iter().enumerate() {
        def.steps.push(step_from_config(name, index, step)?);
    }
    Ok(def)
}

fn step_from_config(task: &str, index: usize, step: &StepConfig) -> Result<Step> {
    let invalid = |msg: &str| {
        DocrunError::ConfigError(format!("task '{task}' step {index}: {msg}"))
    };

    let cmd = match (&step.cmd, &step.program, &step.mkdir) {
        (Some(script), None, None) => {
            if !step.args.is_empty() {
                return Err(invalid("`args` cannot be combined with `cmd`; use `program`"));
            }
            CommandSpec::shell(script)
        }
        (None, Some(program), None) => {
            if program.trim().is_empty() {
                return Err(invalid("`program` must not be empty"));
            }
            CommandSpec::new(program.clone()).args(step.args.iter().cloned())
        }
        (None, None, Some(dir)) => {
            if !step.args.is_empty()
                || step.cwd.is_some()
                || !step.env.is_empty()
                || step.long_running
            {
                return Err(invalid(
                    "`mkdir` steps take no `args`, `cwd`, `env` or `long_running`",
                ));
            }
            if dir.trim().is_empty() {
                return Err(invalid("`mkdir` must not be empty"));
            }
            return Ok(Step::EnsureDir(PathBuf::from(dir)));
        }
        (None, None, None) => {
            return Err(invalid("one of `cmd`, `program` or `mkdir` is required"));
        }
        _ => {
            return Err(invalid("only one of `cmd`, `program` or `mkdir` may be set"));
        }
    };

    let mut cmd = cmd.long_running(step.long_running);
    cmd.cwd = step.cwd.as_ref().map(PathBuf::from);
    cmd.env = step.env.clone();
    Ok(Step::Exec(cmd))
}
