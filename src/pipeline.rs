// src/pipeline.rs

//! The built-in documentation pipeline.
//!
//! Two tasks, one edge:
//!
//! ```text
//! doc:   <generator>
//!        mkdir -p <build_root>/<doc_dir>
//!        <renderer> <build_root>/<doc_dir>/<rendered_name> <overview>
//! serve: after doc
//!        (cd <build_root>/<doc_dir>) <server> <port>
//! ```
//!
//! The renderer writes into the same directory the generator populates, and
//! `serve` uses that directory as its root; the three paths must agree.

use std::path::PathBuf;

use crate::config::model::{ConfigFile, PipelineSection};
use crate::config::validate::task_def_from_config;
use crate::dag::{CommandSpec, Step, TaskDef, TaskGraph};
use crate::errors::{DocrunError, Result};

pub const DOC_TASK: &str = "doc";
pub const SERVE_TASK: &str = "serve";

impl PipelineSection {
    /// `<build_root>/<doc_dir>`: where the overview is rendered and what
    /// gets served.
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.build_root).join(&self.doc_dir)
    }

    /// Path of the rendered overview document.
    pub fn rendered_path(&self) -> PathBuf {
        self.output_dir().join(&self.rendered_name)
    }
}

/// Build the `doc` task from pipeline settings.
pub fn doc_task(p: &PipelineSection) -> Result<TaskDef> {
    let generator = generator_command(p)?;

    let renderer = argv_command("renderer", &p.renderer)?
        .arg(p.rendered_path().to_string_lossy())
        .arg(p.overview.clone());

    Ok(TaskDef::new(DOC_TASK)
        .description("Generate API docs and render the overview document")
        .step(Step::Exec(generator))
        .step(Step::EnsureDir(p.output_dir()))
        .step(Step::Exec(renderer)))
}

/// Build the `serve` task from pipeline settings.
pub fn serve_task(p: &PipelineSection) -> Result<TaskDef> {
    let server = argv_command("server", &p.server)?
        .arg(p.port.to_string())
        .cwd(p.output_dir())
        .long_running(true);

    Ok(TaskDef::new(SERVE_TASK)
        .description(format!(
            "Serve {} over HTTP on port {}",
            p.output_dir().display(),
            p.port
        ))
        .after(DOC_TASK)
        .step(Step::Exec(server)))
}

/// Assemble the full task graph: built-in tasks plus `[task.<name>]` entries.
pub fn build_task_graph(cfg: &ConfigFile) -> Result<TaskGraph> {
    let mut defs = vec![doc_task(&cfg.pipeline)?, serve_task(&cfg.pipeline)?];
    for (name, task) in cfg.task.iter() {
        defs.push(task_def_from_config(name, task)?);
    }
    TaskGraph::new(defs)
}

fn generator_command(p: &PipelineSection) -> Result<CommandSpec> {
    match &p.toolchain {
        Some(toolchain) => Ok(CommandSpec::new("rustup")
            .args(["run", toolchain.as_str()])
            .args(p.generator.iter().cloned())),
        None => argv_command("generator", &p.generator),
    }
}

fn argv_command(key: &str, argv: &[String]) -> Result<CommandSpec> {
    CommandSpec::from_argv(argv.iter().cloned()).ok_or_else(|| {
        DocrunError::ConfigError(format!("[pipeline].{key} must name a program"))
    })
}
