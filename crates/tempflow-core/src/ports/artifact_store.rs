//! ArtifactStore port - flat namespace of named text artifacts.

use async_trait::async_trait;

use crate::domain::{ArtifactId, PipelineError};

/// Durable storage for task outputs.
///
/// # Contract
/// - Existence of an artifact is the only completion marker of its task.
/// - `put` is all-or-nothing: a failed write leaves no artifact behind.
/// - Artifacts are never overwritten; `put` on an existing name fails with
///   `PipelineError::ArtifactExists`.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn exists(&self, artifact: &ArtifactId) -> Result<bool, PipelineError>;

    /// Full content of an artifact, `PipelineError::ArtifactMissing` if absent.
    async fn get(&self, artifact: &ArtifactId) -> Result<String, PipelineError>;

    async fn put(&self, artifact: &ArtifactId, content: &str) -> Result<(), PipelineError>;

    /// Human-readable location for logs (a path, a key, ...).
    fn locate(&self, artifact: &ArtifactId) -> String;
}
