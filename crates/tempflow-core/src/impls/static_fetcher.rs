//! StaticFetcher - canned responses keyed by URL.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::PipelineError;
use crate::ports::Fetcher;

/// Serves bodies registered up front; unknown URLs behave like an
/// unreachable endpoint.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, PipelineError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| PipelineError::Network {
                url: url.to_string(),
                message: "no response registered".to_string(),
            })
    }
}
