use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{check_batch, Embedder};
use crate::core::config::settings::EmbeddingSettings;
use crate::core::errors::UpstreamServiceError;

/// Hugging Face hosted feature-extraction endpoint.
#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    endpoint: String,
    token: String,
    dimension: usize,
    client: Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HuggingFaceEmbedder {
    pub fn new(settings: &EmbeddingSettings, token: String) -> Result<Self, UpstreamServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| UpstreamServiceError::Embedding(e.to_string()))?;

        Ok(Self {
            endpoint: format!(
                "{}/{}/pipeline/feature-extraction",
                settings.base_url.trim_end_matches('/'),
                settings.model
            ),
            token,
            dimension: settings.dimension,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, UpstreamServiceError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "inputs": inputs,
            "options": { "wait_for_model": true },
        });

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamServiceError::Embedding(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(UpstreamServiceError::Embedding(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let vectors: Vec<Vec<f32>> = res
            .json()
            .await
            .map_err(|e| UpstreamServiceError::Embedding(format!("malformed response: {}", e)))?;

        check_batch(&vectors, inputs.len(), self.dimension)?;
        tracing::debug!("Embedded {} texts via {}", inputs.len(), self.endpoint);
        Ok(vectors)
    }
}
