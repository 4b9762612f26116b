// tests/directory_idempotence.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::{FakeExecutor, fake_pipeline, init_tracing};

use std::error::Error;

use docrun::engine::{Resolution, Resolver};
use docrun::errors::DocrunError;
use docrun::fs::RealFileSystem;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn doc_twice_without_cleaning_succeeds() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .build_graph();

    let exec = FakeExecutor::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), RealFileSystem, dir.path());

    assert!(matches!(resolver.resolve("doc").await?, Resolution::Completed));
    assert!(dir.path().join("target/doc").is_dir());

    assert!(matches!(resolver.resolve("doc").await?, Resolution::Completed));
    assert!(dir.path().join("target/doc").is_dir());
    assert_eq!(exec.executed().len(), 4);

    Ok(())
}

#[tokio::test]
async fn existing_output_contents_are_left_alone() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("target/doc/mycrate"))?;
    std::fs::write(dir.path().join("target/doc/mycrate/index.html"), "api")?;

    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .build_graph();
    let mut resolver = Resolver::new(&graph, FakeExecutor::new(), RealFileSystem, dir.path());

    resolver.resolve("doc").await?;

    let kept = std::fs::read_to_string(dir.path().join("target/doc/mycrate/index.html"))?;
    assert_eq!(kept, "api");
    Ok(())
}

#[tokio::test]
async fn file_blocking_output_directory_fails() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("target"), "not a directory")?;

    let graph = ConfigFileBuilder::new()
        .with_pipeline(fake_pipeline())
        .build_graph();
    let exec = FakeExecutor::new();
    let mut resolver = Resolver::new(&graph, exec.clone(), RealFileSystem, dir.path());

    let err = resolver.resolve("serve").await.unwrap_err();
    match err {
        DocrunError::FilesystemError { ref path, .. } => {
            assert_eq!(path, &dir.path().join("target/doc"));
        }
        ref other => panic!("Expected FilesystemError, got: {:?}", other),
    }
    assert_eq!(exec.services_spawned(), 0);
    Ok(())
}
