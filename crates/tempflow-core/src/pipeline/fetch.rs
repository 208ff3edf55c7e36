//! Fetch stage: download raw text and store it line by line.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::expect_inputs;
use crate::domain::{ArtifactId, PipelineError, TaskId, TaskInput};
use crate::ports::Fetcher;
use crate::task::Task;

/// Split `body` on `\n` and terminate every piece with `\n`.
///
/// A body that already ends in `\n` gains a trailing blank line; the parser
/// treats trailing blank lines as harmless.
pub fn to_lines(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1);
    for line in body.split('\n') {
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub struct FetchTask {
    id: TaskId,
    url: String,
    output: ArtifactId,
    fetcher: Arc<dyn Fetcher>,
}

impl FetchTask {
    pub fn new(
        id: impl Into<TaskId>,
        url: impl Into<String>,
        output: impl Into<ArtifactId>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            output: output.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl Task for FetchTask {
    fn id(&self) -> TaskId {
        self.id.clone()
    }

    fn dependencies(&self) -> Vec<TaskId> {
        Vec::new()
    }

    fn output(&self) -> ArtifactId {
        self.output.clone()
    }

    async fn run(&self, inputs: &[TaskInput]) -> Result<String, PipelineError> {
        expect_inputs(&self.id, inputs, 0)?;
        let body = self.fetcher.fetch_text(&self.url).await?;
        debug!(task = %self.id, url = %self.url, bytes = body.len(), "raw text fetched");
        Ok(to_lines(&body))
    }
}
