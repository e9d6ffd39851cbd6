use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::UpstreamServiceError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "groq")
    fn name(&self) -> &str;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, UpstreamServiceError>;
}
