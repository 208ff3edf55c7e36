//! TaskRegistry - tasks keyed by id, in registration order.

use std::collections::HashMap;
use std::sync::Arc;

use super::Task;
use crate::domain::{PipelineError, TaskId};

/// Holds every task of a graph under construction.
///
/// Registration order is kept so that iteration (and therefore planning and
/// status listings) is deterministic.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Vec<Arc<dyn Task>>,
    index: HashMap<TaskId, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Arc<dyn Task>) -> Result<(), PipelineError> {
        let id = task.id();
        if self.index.contains_key(&id) {
            return Err(PipelineError::DuplicateTask(id));
        }
        self.index.insert(id, self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    pub fn get(&self, id: &TaskId) -> Option<Arc<dyn Task>> {
        self.index.get(id).map(|&i| Arc::clone(&self.tasks[i]))
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.index.contains_key(id)
    }

    /// Registered ids in registration order.
    pub fn registered_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Task>> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::testing::EchoTask;

    #[test]
    fn register_and_get() {
        let mut registry = TaskRegistry::new();
        registry.register(Arc::new(EchoTask::new("a", &[]))).unwrap();

        let task = registry.get(&TaskId::new("a")).expect("registered");
        assert_eq!(task.id(), TaskId::new("a"));
        assert!(registry.get(&TaskId::new("b")).is_none());
    }

    #[test]
    fn double_registration() {
        let mut registry = TaskRegistry::new();
        registry.register(Arc::new(EchoTask::new("a", &[]))).unwrap();
        let result = registry.register(Arc::new(EchoTask::new("a", &["b"])));

        assert!(matches!(result, Err(PipelineError::DuplicateTask(id)) if id == TaskId::new("a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = TaskRegistry::new();
        for id in ["c", "a", "b"] {
            registry.register(Arc::new(EchoTask::new(id, &[]))).unwrap();
        }
        assert_eq!(
            registry.registered_ids(),
            vec![TaskId::new("c"), TaskId::new("a"), TaskId::new("b")]
        );
    }
}
