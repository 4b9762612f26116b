// tests/config_loading.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use docrun::config::loader::config_root_dir;
use docrun::config::{ConfigFile, RawConfigFile, StepConfig, load_and_validate, load_or_default};
use docrun::dag::{Step, TaskGraph};
use docrun::errors::DocrunError;
use docrun::pipeline::build_task_graph;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

fn graph_from(contents: &str) -> docrun::errors::Result<TaskGraph> {
    let file = write_config(contents);
    let cfg = load_and_validate(file.path())?;
    build_task_graph(&cfg)
}

#[test]
fn empty_file_yields_builtin_pipeline() -> TestResult {
    let graph = graph_from("")?;

    let names: Vec<&str> = graph.task_names().collect();
    assert_eq!(names, vec!["doc", "serve"]);
    assert_eq!(graph.dependencies_of("serve"), &["doc".to_string()]);
    assert!(graph.dependencies_of("doc").is_empty());
    assert_eq!(graph.dependents_of("doc"), &["serve".to_string()]);

    let doc = graph.get("doc").unwrap();
    assert_eq!(doc.steps.len(), 3);
    assert_eq!(doc.steps[0].to_string(), "cargo doc");
    assert_eq!(doc.steps[1], Step::EnsureDir(PathBuf::from("target/doc")));
    assert_eq!(
        doc.steps[2].to_string(),
        "pandoc --standalone -o target/doc/README.html README.md"
    );

    let serve = graph.get("serve").unwrap();
    assert_eq!(serve.steps.len(), 1);
    assert!(serve.steps[0].is_long_running());
    assert_eq!(serve.steps[0].to_string(), "python3 -m http.server 8000");
    Ok(())
}

#[test]
fn pipeline_section_and_extra_tasks_are_read() -> TestResult {
    let graph = graph_from(
        r#"
[pipeline]
build_root = "build"
port = 4000
generator = ["cargo", "doc", "--no-deps"]

[task.lint]
description = "Check links"
after = ["doc"]
steps = [
  { cmd = "echo checking" },
  { program = "lychee", args = ["README.html"], cwd = "build/doc", env = { NO_COLOR = "1" } },
  { mkdir = "build/lint" },
]
"#,
    )?;

    assert_eq!(graph.len(), 3);
    let lint = graph.get("lint").unwrap();
    assert_eq!(lint.description.as_deref(), Some("Check links"));
    assert_eq!(lint.deps, vec!["doc".to_string()]);
    assert_eq!(lint.steps.len(), 3);
    match &lint.steps[1] {
        Step::Exec(cmd) => {
            assert_eq!(cmd.program, "lychee");
            assert_eq!(cmd.cwd, Some(PathBuf::from("build/doc")));
            assert_eq!(cmd.env.get("NO_COLOR").map(String::as_str), Some("1"));
        }
        other => panic!("Expected Exec step, got: {:?}", other),
    }
    assert_eq!(lint.steps[2], Step::EnsureDir(PathBuf::from("build/lint")));

    let doc = graph.get("doc").unwrap();
    assert_eq!(doc.steps[0].to_string(), "cargo doc --no-deps");
    assert_eq!(doc.steps[1], Step::EnsureDir(PathBuf::from("build/doc")));
    assert!(graph.get("serve").unwrap().steps[0].to_string().ends_with("4000"));
    Ok(())
}

#[test]
fn dag_cycle_returns_structured_error() {
    let result = graph_from(
        r#"
[task.a]
after = ["b"]
steps = [{ cmd = "echo a" }]

[task.b]
after = ["a"]
steps = [{ cmd = "echo b" }]
"#,
    );

    match result {
        Err(DocrunError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('a') || msg.contains('b'));
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unknown_dependency_returns_config_error() {
    let result = graph_from(
        r#"
[task.a]
after = ["NonExistent"]
steps = [{ cmd = "echo a" }]
"#,
    );

    match result {
        Err(DocrunError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn builtin_task_names_are_reserved() {
    let file = write_config(
        r#"
[task.serve]
steps = [{ cmd = "echo hijack" }]
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DocrunError::ConfigError(ref m) if m.contains("reserved")));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn step_must_have_exactly_one_action() {
    let both = RawConfigFile {
        task: [(
            "x".to_string(),
            TaskConfigBuilder::new()
                .step(StepConfig {
                    cmd: Some("echo".to_string()),
                    mkdir: Some("out".to_string()),
                    ..StepConfig::default()
                })
                .build(),
        )]
        .into_iter()
        .collect(),
        ..RawConfigFile::default()
    };
    assert!(matches!(
        ConfigFile::try_from(both),
        Err(DocrunError::ConfigError(ref m)) if m.contains("only one of")
    ));

    let none = RawConfigFile {
        task: [(
            "x".to_string(),
            TaskConfigBuilder::new().step(StepConfig::default()).build(),
        )]
        .into_iter()
        .collect(),
        ..RawConfigFile::default()
    };
    assert!(matches!(
        ConfigFile::try_from(none),
        Err(DocrunError::ConfigError(ref m)) if m.contains("is required")
    ));
}

#[test]
fn mkdir_step_rejects_command_fields() {
    let raw = RawConfigFile {
        task: [(
            "x".to_string(),
            TaskConfigBuilder::new()
                .step(StepConfig {
                    mkdir: Some("out".to_string()),
                    cwd: Some("elsewhere".to_string()),
                    ..StepConfig::default()
                })
                .build(),
        )]
        .into_iter()
        .collect(),
        ..RawConfigFile::default()
    };
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(DocrunError::ConfigError(_))
    ));
}

#[test]
fn long_running_step_must_be_last() {
    let result = graph_from(
        r#"
[task.watch]
steps = [
  { program = "server", long_running = true },
  { cmd = "echo never" },
]
"#,
    );
    assert!(matches!(
        result,
        Err(DocrunError::ConfigError(ref m)) if m.contains("must be the last step")
    ));
}

#[test]
fn nothing_may_depend_on_a_long_running_task() {
    let cfg = ConfigFileBuilder::new()
        .with_task(
            "after-serve",
            TaskConfigBuilder::new().after("serve").cmd("echo x").build(),
        )
        .build();

    let err = build_task_graph(&cfg).unwrap_err();
    assert!(matches!(err, DocrunError::ConfigError(ref m) if m.contains("long-running")));
}

#[test]
fn unknown_keys_are_rejected() {
    let file = write_config(
        r#"
[pipeline]
prot = 8000
"#,
    );
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DocrunError::TomlError(_)));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn zero_port_is_rejected() {
    let file = write_config("[pipeline]\nport = 0\n");
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DocrunError::ConfigError(ref m) if m.contains("port")));
}

#[test]
fn empty_collaborator_argv_is_rejected() {
    let file = write_config("[pipeline]\nrenderer = []\n");
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DocrunError::ConfigError(ref m) if m.contains("renderer")));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let err = load_or_default(Some(Path::new("/definitely/not/here/Docrun.toml"))).unwrap_err();
    assert!(matches!(err, DocrunError::ConfigError(_)));
}

#[test]
fn explicit_config_sets_project_root() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Docrun.toml");
    std::fs::write(&path, "[pipeline]\nport = 8123\n")?;

    let (cfg, root) = load_or_default(Some(&path))?;
    assert_eq!(cfg.pipeline.port, 8123);
    assert_eq!(root, dir.path());
    Ok(())
}

#[test]
fn config_root_dir_handles_bare_file_names() {
    assert_eq!(config_root_dir(Path::new("Docrun.toml")), PathBuf::from("."));
    assert_eq!(
        config_root_dir(Path::new("docs/Docrun.toml")),
        PathBuf::from("docs")
    );
}
