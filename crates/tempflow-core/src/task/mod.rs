//! Task - the unit of work the scheduler drives.
//!
//! A task declares the tasks it depends on and the one artifact it produces.
//! The scheduler hands it the contents of its dependencies' artifacts, in the
//! order `dependencies()` lists them, and persists whatever `run` returns.

pub mod registry;

use async_trait::async_trait;

use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};

pub use self::registry::TaskRegistry;

/// Object-safe task interface.
///
/// `run` must be idempotent: the same inputs always produce byte-identical
/// output. It never touches the artifact store itself.
#[async_trait]
pub trait Task: Send + Sync {
    fn id(&self) -> TaskId;

    /// Upstream tasks, in the order their artifacts are passed to `run`.
    fn dependencies(&self) -> Vec<TaskId>;

    fn output(&self) -> ArtifactId;

    async fn run(&self, inputs: &[TaskInput]) -> Result<String, PipelineError>;
}
