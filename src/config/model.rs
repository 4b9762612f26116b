// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Validated configuration.
///
/// Constructed from [`RawConfigFile`] via `TryFrom` (see `validate.rs`),
/// so holders of a `ConfigFile` can rely on step shapes and pipeline values
/// being sane. Graph-level checks (unknown deps, cycles) happen when the
/// [`TaskGraph`](crate::dag::TaskGraph) is built.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub pipeline: PipelineSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        pipeline: PipelineSection,
        task: BTreeMap<String, TaskConfig>,
    ) -> Self {
        Self { pipeline, task }
    }
}

impl Default for ConfigFile {
    /// The built-in pipeline with no extra tasks.
    fn default() -> Self {
        Self::new_unchecked(PipelineSection::default(), BTreeMap::new())
    }
}

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [pipeline]
/// build_root = "target"
/// port = 8000
///
/// [task.lint]
/// after = ["doc"]
/// steps = [{ cmd = "echo lint" }]
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Extra tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[pipeline]` section: collaborators and the output layout of the
/// built-in `doc` and `serve` tasks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSection {
    /// Conventional build-output root; the generator writes below it.
    #[serde(default = "default_build_root")]
    pub build_root: String,

    /// Documentation subdirectory of `build_root`. This is what gets served.
    #[serde(default = "default_doc_dir")]
    pub doc_dir: String,

    /// Repository-relative overview document fed to the renderer.
    #[serde(default = "default_overview")]
    pub overview: String,

    /// File name of the rendered overview inside `doc_dir`.
    #[serde(default = "default_rendered_name")]
    pub rendered_name: String,

    /// API-doc generator argv; run with no extra arguments.
    #[serde(default = "default_generator")]
    pub generator: Vec<String>,

    /// Renderer argv prefix; output path and input path are appended.
    #[serde(default = "default_renderer")]
    pub renderer: Vec<String>,

    /// Static file server argv prefix; the port is appended.
    #[serde(default = "default_server")]
    pub server: Vec<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Run the generator under `rustup run <toolchain>`.
    #[serde(default)]
    pub toolchain: Option<String>,
}

fn default_build_root() -> String {
    "target".to_string()
}

fn default_doc_dir() -> String {
    "doc".to_string()
}

fn default_overview() -> String {
    "README.md".to_string()
}

fn default_rendered_name() -> String {
    "README.html".to_string()
}

fn default_generator() -> Vec<String> {
    vec!["cargo".to_string(), "doc".to_string()]
}

fn default_renderer() -> Vec<String> {
    vec![
        "pandoc".to_string(),
        "--standalone".to_string(),
        "-o".to_string(),
    ]
}

fn default_server() -> Vec<String> {
    vec![
        "python3".to_string(),
        "-m".to_string(),
        "http.server".to_string(),
    ]
}

pub const DEFAULT_PORT: u16 = 8000;

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            build_root: default_build_root(),
            doc_dir: default_doc_dir(),
            overview: default_overview(),
            rendered_name: default_rendered_name(),
            generator: default_generator(),
            renderer: default_renderer(),
            server: default_server(),
            port: default_port(),
            toolchain: None,
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Tasks that must complete before this one, in order.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

/// One entry of a task's `steps` array.
///
/// Exactly one of `cmd`, `program` or `mkdir` must be set; the remaining
/// fields only apply to command steps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Shell string, run through `sh -c` (`cmd /C` on Windows).
    #[serde(default)]
    pub cmd: Option<String>,

    /// Program to execute directly, without a shell.
    #[serde(default)]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Directory to create (idempotent).
    #[serde(default)]
    pub mkdir: Option<String>,

    /// Working directory, relative to the project root.
    #[serde(default)]
    pub cwd: Option<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Process runs until interrupted; only allowed as the last step.
    #[serde(default)]
    pub long_running: bool,
}
