// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `docrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "docrun",
    version,
    about = "Build API docs plus a rendered overview, and serve them locally.",
    long_about = None
)]
pub struct CliArgs {
    /// Task to run (`doc`, `serve`, or a task from the config file).
    #[arg(value_name = "TASK", required_unless_present = "list")]
    pub task: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Docrun.toml` in the current directory if it exists,
    /// otherwise the built-in pipeline defaults.
    #[arg(long, value_name = "PATH", env = "DOCRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port for the `serve` task's file server.
    #[arg(long, value_name = "PORT", env = "DOCRUN_PORT")]
    pub port: Option<u16>,

    /// Run the API-doc generator under this rustup toolchain.
    #[arg(long, value_name = "NAME")]
    pub toolchain: Option<String>,

    /// List known tasks and exit.
    #[arg(long)]
    pub list: bool,

    /// Print the execution plan for TASK, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DOCRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
