#![allow(dead_code)]

use std::collections::BTreeMap;

use docrun::config::{ConfigFile, PipelineSection, RawConfigFile, StepConfig, TaskConfig};
use docrun::dag::TaskGraph;
use docrun::pipeline::build_task_graph;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                pipeline: PipelineSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_pipeline(mut self, pipeline: PipelineSection) -> Self {
        self.config.pipeline = pipeline;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.pipeline.port = port;
        self
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    /// Build the config and the full task graph (built-ins + extra tasks).
    pub fn build_graph(self) -> TaskGraph {
        build_task_graph(&self.build()).expect("Failed to build task graph from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new() -> Self {
        Self {
            task: TaskConfig::default(),
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.task.description = Some(text.to_string());
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn cmd(mut self, script: &str) -> Self {
        self.task.steps.push(StepConfig {
            cmd: Some(script.to_string()),
            ..StepConfig::default()
        });
        self
    }

    pub fn program(mut self, program: &str, args: &[&str]) -> Self {
        self.task.steps.push(StepConfig {
            program: Some(program.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..StepConfig::default()
        });
        self
    }

    pub fn mkdir(mut self, dir: &str) -> Self {
        self.task.steps.push(StepConfig {
            mkdir: Some(dir.to_string()),
            ..StepConfig::default()
        });
        self
    }

    pub fn long_running(mut self, program: &str, args: &[&str]) -> Self {
        self.task.steps.push(StepConfig {
            program: Some(program.to_string()),
            args: args.iter().map(|a| a.to_string()).collect(),
            long_running: true,
            ..StepConfig::default()
        });
        self
    }

    pub fn step(mut self, step: StepConfig) -> Self {
        self.task.steps.push(step);
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}

impl Default for TaskConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
