//! InMemoryArtifactStore - artifact store for tests and dry runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ArtifactId, PipelineError};
use crate::ports::ArtifactStore;

/// Artifacts kept in a map; nothing survives the process.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the scheduler wrote.
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    artifacts: Arc<Mutex<HashMap<ArtifactId, String>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an artifact, as if an earlier run had produced it.
    pub async fn seed(&self, artifact: impl Into<ArtifactId>, content: impl Into<String>) {
        self.artifacts
            .lock()
            .await
            .insert(artifact.into(), content.into());
    }

    pub async fn len(&self) -> usize {
        self.artifacts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.lock().await.is_empty()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn exists(&self, artifact: &ArtifactId) -> Result<bool, PipelineError> {
        Ok(self.artifacts.lock().await.contains_key(artifact))
    }

    async fn get(&self, artifact: &ArtifactId) -> Result<String, PipelineError> {
        self.artifacts
            .lock()
            .await
            .get(artifact)
            .cloned()
            .ok_or_else(|| PipelineError::ArtifactMissing(artifact.clone()))
    }

    async fn put(&self, artifact: &ArtifactId, content: &str) -> Result<(), PipelineError> {
        let mut artifacts = self.artifacts.lock().await;
        if artifacts.contains_key(artifact) {
            return Err(PipelineError::ArtifactExists(artifact.clone()));
        }
        artifacts.insert(artifact.clone(), content.to_string());
        Ok(())
    }

    fn locate(&self, artifact: &ArtifactId) -> String {
        format!("memory:{artifact}")
    }
}
