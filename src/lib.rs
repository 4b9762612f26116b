// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default, validate_pipeline};
use crate::dag::{ExecutionPlan, Step, TaskGraph};
use crate::engine::{Resolution, Resolver, supervise};
use crate::errors::{DocrunError, Result};
use crate::exec::RealExecutor;
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (+ CLI overrides)
/// - task graph construction
/// - `--list` / `--dry-run` output
/// - the resolver with the real process executor
/// - SIGINT / SIGTERM forwarding, installed before anything is spawned
pub async fn run(args: CliArgs) -> Result<()> {
    let (mut cfg, root) = load_or_default(args.config.as_deref())?;
    apply_overrides(&mut cfg, &args)?;

    let graph = pipeline::build_task_graph(&cfg)?;

    if args.list {
        print_task_list(&graph);
        return Ok(());
    }

    let target = args
        .task
        .as_deref()
        .ok_or_else(|| DocrunError::ConfigError("no task given".to_string()))?;

    if args.dry_run {
        let plan = ExecutionPlan::resolve(&graph, target)?;
        print_dry_run(&graph, &plan, &root);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    forward_shutdown_signals(cancel.clone())?;

    let mut resolver = Resolver::new(&graph, RealExecutor::new(), RealFileSystem, root)
        .with_cancellation(cancel.clone());

    match resolver.resolve(target).await? {
        Resolution::Completed => {
            info!(target = %target, "all tasks completed");
            Ok(())
        }
        Resolution::Serving(service) => {
            let outcome = supervise(service, cancel).await?;
            info!(?outcome, "service stopped");
            Ok(())
        }
    }
}

/// Apply `--port` / `--toolchain` on top of the loaded config.
fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(port) = args.port {
        cfg.pipeline.port = port;
    }
    if let Some(ref toolchain) = args.toolchain {
        cfg.pipeline.toolchain = Some(toolchain.clone());
    }
    validate_pipeline(&cfg.pipeline)
}

/// SIGINT or SIGTERM → cancel the token the resolver and supervisor watch.
///
/// Handlers are registered before this returns, so neither signal can take
/// the default (process-killing) action once a step has been spawned.
#[cfg(unix)]
fn forward_shutdown_signals(cancel: CancellationToken) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        let received = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        warn!(signal = received, "shutdown requested");
        cancel.cancel();
    });
    Ok(())
}

#[cfg(not(unix))]
fn forward_shutdown_signals(cancel: CancellationToken) -> Result<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        warn!(signal = "Ctrl+C", "shutdown requested");
        cancel.cancel();
    });
    Ok(())
}

fn print_task_list(graph: &TaskGraph) {
    println!("tasks ({}):", graph.len());
    for task in graph.tasks() {
        match task.description {
            Some(ref desc) => println!("  {:<12} {desc}", task.name),
            None => println!("  {}", task.name),
        }
        if !task.deps.is_empty() {
            println!("      after: {:?}", task.deps);
        }
    }
}

/// Simple dry-run output: print planned tasks and their steps.
fn print_dry_run(graph: &TaskGraph, plan: &ExecutionPlan, root: &Path) {
    println!("docrun dry-run: {}", plan.target());
    println!("  root: {}", root.display());
    println!();

    for task in plan.tasks(graph) {
        println!("  - {}", task.name);
        for (index, step) in task.steps.iter().enumerate() {
            println!("      [{index}] {step}");
            if let Step::Exec(cmd) = step {
                if let Some(ref cwd) = cmd.cwd {
                    println!("          cwd: {}", cwd.display());
                }
                if !cmd.env.is_empty() {
                    println!("          env: {:?}", cmd.env);
                }
                if cmd.long_running {
                    println!("          long_running: true");
                }
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
