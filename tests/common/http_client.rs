//! HTTP client helpers for tests.

use std::time::Duration;

use dealmatch::gateway::payload::ChatResponse;
use serde::Deserialize;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        Ok(self.client.get(self.url("/health")).send().await?.json().await?)
    }

    pub async fn version(&self) -> Result<serde_json::Value, TestClientError> {
        Ok(self.client.get(self.url("/version")).send().await?.json().await?)
    }

    pub async fn chat(&self, body: serde_json::Value) -> Result<ChatResponse, TestClientError> {
        let resp = self.client.post(self.url("/chat")).json(&body).send().await?;

        match resp.status().as_u16() {
            200 => Ok(resp.json().await?),
            422 => Err(TestClientError::Rejected(resp.text().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }
}
