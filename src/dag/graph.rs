// src/dag/graph.rs

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::task::{TaskDef, TaskName};
use crate::errors::{DocrunError, Result};

/// Immutable task graph keyed by task name.
///
/// Constructed once at startup (see [`TaskGraph::new`]) and handed to the
/// resolver by reference. All structural invariants are checked on
/// construction, so the rest of the crate can assume:
/// - every dependency names an existing task
/// - there are no cycles
/// - long-running steps are last in their task and nothing depends on
///   such a task
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: BTreeMap<TaskName, TaskDef>,
    /// Reverse edges: task -> tasks listing it in their deps.
    dependents: HashMap<TaskName, Vec<TaskName>>,
}

impl TaskGraph {
    /// Validate and freeze a set of task definitions.
    pub fn new(defs: impl IntoIterator<Item = TaskDef>) -> Result<Self> {
        let mut tasks: BTreeMap<TaskName, TaskDef> = BTreeMap::new();
        for def in defs {
            if def.name.trim().is_empty() {
                return Err(DocrunError::ConfigError(
                    "task names must not be empty".to_string(),
                ));
            }
            if tasks.contains_key(&def.name) {
                return Err(DocrunError::ConfigError(format!(
                    "task '{}' is defined more than once",
                    def.name
                )));
            }
            tasks.insert(def.name.clone(), def);
        }

        validate_dependencies(&tasks)?;
        validate_acyclic(&tasks)?;

        let mut dependents: HashMap<TaskName, Vec<TaskName>> = HashMap::new();
        for (name, def) in tasks.iter() {
            for dep in def.deps.iter() {
                dependents.entry(dep.clone()).or_default().push(name.clone());
            }
        }

        validate_long_running(&tasks, &dependents)?;

        Ok(Self { tasks, dependents })
    }

    pub fn get(&self, name: &str) -> Option<&TaskDef> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All tasks, sorted by name.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskDef> {
        self.tasks.values()
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Immediate dependencies of a task, in declaration order.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.tasks
            .get(name)
            .map(|t| t.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks listing it in their deps).
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.dependents
            .get(name)
            .map(|d| d.as_slice())
            .unwrap_or(&[])
    }
}

fn validate_dependencies(tasks: &BTreeMap<TaskName, TaskDef>) -> Result<()> {
    for (name, task) in tasks.iter() {
        for dep in task.deps.iter() {
            if dep == name {
                return Err(DocrunError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !tasks.contains_key(dep) {
                return Err(DocrunError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_acyclic(tasks: &BTreeMap<TaskName, TaskDef>) -> Result<()> {
    // Edge direction: dep -> task, so a valid order lists deps first.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in tasks.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in tasks.iter() {
        for dep in task.deps.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(DocrunError::DagCycle(format!(
            "cycle detected in task DAG involving task '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_long_running(
    tasks: &BTreeMap<TaskName, TaskDef>,
    dependents: &HashMap<TaskName, Vec<TaskName>>,
) -> Result<()> {
    for (name, task) in tasks.iter() {
        let last = task.steps.len().saturating_sub(1);
        for (index, step) in task.steps.iter().enumerate() {
            if step.is_long_running() && index != last {
                return Err(DocrunError::ConfigError(format!(
                    "task '{}': long-running step {} must be the last step",
                    name, index
                )));
            }
        }

        if task.has_long_running_step() {
            if let Some(users) = dependents.get(name).filter(|d| !d.is_empty()) {
                return Err(DocrunError::ConfigError(format!(
                    "task '{}' runs a long-running step and cannot be a dependency of {:?}",
                    name, users
                )));
            }
        }
    }
    Ok(())
}
