//! Task graph: the registered tasks plus the edges between them.

pub mod dependency;

use std::sync::Arc;

use crate::domain::{PipelineError, TaskId};
use crate::task::{Task, TaskRegistry};

pub use self::dependency::DependencyGraph;

/// A validated, acyclic set of tasks.
///
/// Only [`PipelineBuilder::build`](crate::app::PipelineBuilder::build)
/// produces one, so every dependency named by a task is registered, every
/// artifact has a single producer and there is no cycle.
pub struct TaskGraph {
    registry: TaskRegistry,
    deps: DependencyGraph,
}

impl TaskGraph {
    pub(crate) fn from_validated(registry: TaskRegistry, deps: DependencyGraph) -> Self {
        Self { registry, deps }
    }

    pub fn task(&self, id: &TaskId) -> Option<Arc<dyn Task>> {
        self.registry.get(id)
    }

    pub(crate) fn require(&self, id: &TaskId) -> Result<Arc<dyn Task>, PipelineError> {
        self.task(id)
            .ok_or_else(|| PipelineError::UnknownTask(id.clone()))
    }

    /// Task ids in registration order.
    pub fn ids(&self) -> Vec<TaskId> {
        self.registry.registered_ids()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Tasks nothing depends on: the default goals of a run.
    pub fn terminal_tasks(&self) -> Vec<TaskId> {
        self.deps.terminal_nodes()
    }

    pub fn dependencies(&self, id: &TaskId) -> &[TaskId] {
        self.deps.get_dependencies(id)
    }

    pub fn dependents_closure(&self, id: &TaskId) -> Vec<TaskId> {
        self.deps.dependents_closure(id)
    }

    /// Every task, dependencies first.
    pub fn topological_order(&self) -> Result<Vec<TaskId>, PipelineError> {
        self.deps
            .topological_order()
            .map_err(|cycle| PipelineError::Cycle { cycle })
    }
}
