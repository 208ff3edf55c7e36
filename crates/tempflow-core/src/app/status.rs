//! Status - which artifacts of a graph already exist.

use serde::Serialize;

use crate::domain::{ArtifactId, PipelineError, TaskId};
use crate::graph::TaskGraph;
use crate::ports::ArtifactStore;

/// One task's completion as seen through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub task: TaskId,
    pub artifact: ArtifactId,
    pub location: String,
    pub complete: bool,
}

/// Every task in topological order with whether its artifact exists.
pub async fn artifact_status(
    graph: &TaskGraph,
    store: &dyn ArtifactStore,
) -> Result<Vec<ArtifactStatus>, PipelineError> {
    let mut out = Vec::with_capacity(graph.len());
    for id in graph.topological_order()? {
        let artifact = graph.require(&id)?.output();
        out.push(ArtifactStatus {
            complete: store.exists(&artifact).await?,
            location: store.locate(&artifact),
            task: id,
            artifact,
        });
    }
    Ok(out)
}
