// src/config/mod.rs

//! Configuration loading and validation for docrun.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk, or fall back to defaults (`loader.rs`).
//! - Validate step shapes and pipeline values (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, PipelineSection, RawConfigFile, StepConfig, TaskConfig};
pub use validate::validate_pipeline;
