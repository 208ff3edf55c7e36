//! Fetcher port - "fetch text from URL".

use async_trait::async_trait;

use crate::domain::PipelineError;

/// Retrieves the body of a remote resource as text.
///
/// Implementations report every failure (unreachable host, timeout,
/// non-success status) as `PipelineError::Network` and never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, PipelineError>;
}
