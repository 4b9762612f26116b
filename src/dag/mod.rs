// src/dag/mod.rs

//! Task graph representation and resolution.
//!
//! - [`task`] defines tasks, steps and command specs.
//! - [`graph`] holds the validated, immutable graph of tasks.
//! - [`plan`] turns a requested task into a dependency-first execution order.

pub mod graph;
pub mod plan;
pub mod task;

pub use graph::TaskGraph;
pub use plan::ExecutionPlan;
pub use task::{CommandSpec, Step, TaskDef, TaskName};
