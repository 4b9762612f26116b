// src/dag/plan.rs

//! Dependency-first execution order for a requested task.

use std::collections::HashSet;

use tracing::debug;

use crate::dag::graph::TaskGraph;
use crate::dag::task::{TaskDef, TaskName};
use crate::errors::{DocrunError, Result};

/// Ordered list of tasks to run for one execution request.
///
/// Dependencies always precede their dependents and every task appears at
/// most once, even when reachable through several paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    target: TaskName,
    order: Vec<TaskName>,
}

impl ExecutionPlan {
    /// Resolve the plan for `target` by a depth-first walk that visits a
    /// task's dependencies (in declaration order) before the task itself.
    pub fn resolve(graph: &TaskGraph, target: &str) -> Result<Self> {
        if !graph.contains(target) {
            return Err(DocrunError::TaskNotFound(target.to_string()));
        }

        let mut order = Vec::new();
        let mut visited = HashSet::new();
        visit(graph, target, &mut visited, &mut order);

        debug!(target = %target, ?order, "resolved execution plan");

        Ok(Self {
            target: target.to_string(),
            order,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Task names in execution order.
    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    /// Task definitions in execution order.
    pub fn tasks<'g>(&'g self, graph: &'g TaskGraph) -> impl Iterator<Item = &'g TaskDef> {
        self.order.iter().filter_map(move |name| graph.get(name))
    }

    /// Total number of steps across all planned tasks.
    pub fn step_count(&self, graph: &TaskGraph) -> usize {
        self.tasks(graph).map(|t| t.steps.len()).sum()
    }
}

// Recursion depth is bounded by the longest dependency chain; the graph is
// acyclic by construction.
fn visit(graph: &TaskGraph, name: &str, visited: &mut HashSet<TaskName>, order: &mut Vec<TaskName>) {
    if !visited.insert(name.to_string()) {
        return;
    }
    for dep in graph.dependencies_of(name) {
        visit(graph, dep, visited, order);
    }
    order.push(name.to_string());
}
