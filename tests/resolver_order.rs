// tests/resolver_order.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};
use crate::common::{FakeExecutor, fake_pipeline, init_tracing};

use std::error::Error;
use std::path::{Path, PathBuf};

use docrun::config::PipelineSection;
use docrun::engine::{Resolution, ResolutionState, Resolver};
use docrun::fs::{FileSystem, MockFileSystem};

type TestResult = Result<(), Box<dyn Error>>;

const ROOT: &str = "/proj";

fn step_names(exec: &FakeExecutor) -> Vec<(String, usize)> {
    exec.executed_steps()
}

fn pair(task: &str, step: usize) -> (String, usize) {
    (task.to_string(), step)
}

#[tokio::test]
async fn serve_runs_doc_steps_in_order_before_server() -> TestResult {
    init_tracing();
    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .build_graph();

    let exec = FakeExecutor::new();
    let fs = MockFileSystem::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), fs.clone(), ROOT);
    assert!(!resolver.state().is_terminal());

    let resolution = resolver.resolve("serve").await?;
    assert!(matches!(resolution, Resolution::Serving(_)));
    assert_eq!(resolver.state(), &ResolutionState::Completed);
    assert!(resolver.state().is_terminal());

    // generate (0) → ensure-dir (1, native) → render (2) → server
    assert_eq!(
        step_names(&exec),
        vec![pair("doc", 0), pair("doc", 2), pair("serve", 0)]
    );
    assert_eq!(fs.create_calls(), vec![PathBuf::from("/proj/target/doc")]);
    assert!(fs.is_dir(Path::new("/proj/target/doc")));
    assert!(fs.is_dir(Path::new("/proj/target")));

    let executed = exec.executed();
    assert_eq!(executed[0].program, "gen");
    assert!(executed[0].args.is_empty());
    assert_eq!(executed[0].workdir, PathBuf::from(ROOT));

    assert_eq!(executed[1].program, "render");
    assert_eq!(
        executed[1].args,
        vec!["target/doc/README.html".to_string(), "README.md".to_string()]
    );

    let server = &executed[2];
    assert!(server.long_running);
    assert_eq!(server.program, "serve-files");
    assert_eq!(server.args, vec!["8000".to_string()]);
    assert_eq!(server.workdir, PathBuf::from("/proj/target/doc"));
    assert_eq!(exec.services_spawned(), 1);

    Ok(())
}

#[tokio::test]
async fn doc_runs_only_doc() -> TestResult {
    init_tracing();
    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .build_graph();

    let exec = FakeExecutor::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), MockFileSystem::new(), ROOT);

    let resolution = resolver.resolve("doc").await?;
    assert!(matches!(resolution, Resolution::Completed));
    assert_eq!(resolver.state(), &ResolutionState::Completed);

    assert_eq!(step_names(&exec), vec![pair("doc", 0), pair("doc", 2)]);
    assert_eq!(exec.services_spawned(), 0);

    Ok(())
}

#[tokio::test]
async fn shared_dependency_runs_once_and_deps_follow_declaration_order() -> TestResult {
    init_tracing();
    //      base
    //     /    \
    //  right   left
    //     \    /
    //      top   (after = ["right", "left"])
    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .with_task("base", TaskConfigBuilder::new().cmd("echo base").build())
        .with_task(
            "left",
            TaskConfigBuilder::new().after("base").cmd("echo left").build(),
        )
        .with_task(
            "right",
            TaskConfigBuilder::new().after("base").cmd("echo right").build(),
        )
        .with_task(
            "top",
            TaskConfigBuilder::new()
                .after("right")
                .after("left")
                .cmd("echo top")
                .build(),
        )
        .build_graph();

    let exec = FakeExecutor::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), MockFileSystem::new(), ROOT);
    resolver.resolve("top").await?;

    assert_eq!(
        step_names(&exec),
        vec![pair("base", 0), pair("right", 0), pair("left", 0), pair("top", 0)]
    );

    Ok(())
}

#[tokio::test]
async fn user_task_after_doc_sees_cwd_and_env() -> TestResult {
    init_tracing();
    let mut step = docrun::config::StepConfig {
        program: Some("check-links".to_string()),
        args: vec!["README.html".to_string()],
        cwd: Some("target/doc".to_string()),
        ..Default::default()
    };
    step.env.insert("NO_COLOR".to_string(), "1".to_string());

    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .with_task(
            "lint",
            TaskConfigBuilder::new()
                .after("doc")
                .mkdir("target/lint")
                .step(step)
                .build(),
        )
        .build_graph();

    let exec = FakeExecutor::new();
    let fs = MockFileSystem::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), fs.clone(), ROOT);
    resolver.resolve("lint").await?;

    assert_eq!(
        step_names(&exec),
        vec![pair("doc", 0), pair("doc", 2), pair("lint", 1)]
    );
    assert_eq!(
        fs.create_calls(),
        vec![
            PathBuf::from("/proj/target/doc"),
            PathBuf::from("/proj/target/lint")
        ]
    );

    let lint = &exec.executed()[2];
    assert_eq!(lint.workdir, PathBuf::from("/proj/target/doc"));
    assert_eq!(lint.args, vec!["README.html".to_string()]);

    Ok(())
}

#[tokio::test]
async fn pipeline_settings_shape_the_commands() -> TestResult {
    init_tracing();
    let pipeline = PipelineSection {
        build_root: "out".to_string(),
        doc_dir: "site".to_string(),
        overview: "docs/overview.rst".to_string(),
        rendered_name: "index.html".to_string(),
        toolchain: Some("nightly".to_string()),
        port: 9123,
        ..fake_pipeline()
    };
    let graph = ConfigFileBuilder::new().with_pipeline(pipeline).build_graph();

    let exec = FakeExecutor::new();
    let fs = MockFileSystem::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), fs.clone(), ROOT);
    resolver.resolve("serve").await?;

    let executed = exec.executed();
    assert_eq!(executed[0].program, "rustup");
    assert_eq!(executed[0].args, vec!["run", "nightly", "gen"]);
    assert_eq!(
        executed[1].args,
        vec!["out/site/index.html", "docs/overview.rst"]
    );
    assert_eq!(executed[2].args, vec!["9123"]);
    assert_eq!(executed[2].workdir, PathBuf::from("/proj/out/site"));
    assert_eq!(fs.create_calls(), vec![PathBuf::from("/proj/out/site")]);

    Ok(())
}

#[tokio::test]
async fn resolver_can_run_again_after_completion() -> TestResult {
    init_tracing();
    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .build_graph();

    let exec = FakeExecutor::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), MockFileSystem::new(), ROOT);

    resolver.resolve("doc").await?;
    resolver.resolve("doc").await?;

    // Deduplication is per invocation, not across invocations.
    assert_eq!(exec.executed().len(), 4);
    assert_eq!(resolver.state(), &ResolutionState::Completed);

    Ok(())
}
