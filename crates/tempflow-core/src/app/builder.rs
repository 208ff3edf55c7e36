//! PipelineBuilder - assembles and validates a task graph.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{ArtifactId, PipelineError, TaskId};
use crate::graph::{DependencyGraph, TaskGraph};
use crate::task::{Task, TaskRegistry};

/// Collects tasks and turns them into a [`TaskGraph`].
///
/// # Example
/// ```ignore
/// let graph = PipelineBuilder::new()
///     .register(download)?
///     .register(import)?
///     .build()?;
/// ```
///
/// # Fail-fast
/// Duplicate task ids are rejected on `register`. `build` rejects unknown
/// dependencies, artifacts produced by more than one task and cycles, so a
/// graph that builds can always be scheduled.
#[derive(Default)]
pub struct PipelineBuilder {
    registry: TaskRegistry,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Task + 'static>(self, task: T) -> Result<Self, PipelineError> {
        self.register_arc(Arc::new(task))
    }

    pub fn register_arc(mut self, task: Arc<dyn Task>) -> Result<Self, PipelineError> {
        self.registry.register(task)?;
        Ok(self)
    }

    pub fn build(self) -> Result<TaskGraph, PipelineError> {
        let mut deps = DependencyGraph::new();
        let mut producers: HashMap<ArtifactId, TaskId> = HashMap::new();

        for task in self.registry.iter() {
            let id = task.id();
            deps.add_node(id.clone());

            for dependency in task.dependencies() {
                if !self.registry.contains(&dependency) {
                    return Err(PipelineError::MissingDependency {
                        task: id,
                        dependency,
                    });
                }
                deps.add_dependency(id.clone(), dependency);
            }

            let artifact = task.output();
            if let Some(first) = producers.get(&artifact) {
                return Err(PipelineError::DuplicateArtifact {
                    artifact,
                    first: first.clone(),
                    second: id,
                });
            }
            producers.insert(artifact, id);
        }

        if let Some(cycle) = deps.detect_cycle() {
            return Err(PipelineError::Cycle { cycle });
        }

        Ok(TaskGraph::from_validated(self.registry, deps))
    }
}
