// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`resolver`] turns an execution request into a dependency-first run of
//!   task steps, failing fast.
//! - [`supervisor`] owns a long-running service after the build steps are
//!   done and stops it on interrupt.

pub mod resolver;
pub mod supervisor;

pub use resolver::{Resolution, ResolutionState, Resolver};
pub use supervisor::{ServeOutcome, supervise};
