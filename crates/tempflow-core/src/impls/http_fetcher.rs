//! HttpFetcher - `Fetcher` over HTTP(S) with `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::PipelineError;
use crate::ports::Fetcher;

/// Plain GET with a whole-request timeout. No retries.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn network_error(url: &str, err: &reqwest::Error) -> PipelineError {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("endpoint unreachable: {err}")
    } else {
        err.to_string()
    };
    PipelineError::Network {
        url: url.to_string(),
        message,
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, PipelineError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response.text().await.map_err(|e| network_error(url, &e))?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/minT.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("date minT\n2020-01-01 1.0\n"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let body = fetcher
            .fetch_text(&format!("{}/minT.txt", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "date minT\n2020-01-01 1.0\n");
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher
            .fetch_text(&format!("{}/missing.txt", server.uri()))
            .await
            .unwrap_err();
        match err {
            PipelineError::Network { message, .. } => assert_eq!(message, "HTTP 404"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch_text(&server.uri()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Network { .. }));
    }
}
