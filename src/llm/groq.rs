use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::config::settings::LlmSettings;
use crate::core::errors::UpstreamServiceError;

/// Groq's OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct GroqProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl GroqProvider {
    pub fn new(settings: &LlmSettings, api_key: String) -> Result<Self, UpstreamServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| UpstreamServiceError::Llm(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: settings.model.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, UpstreamServiceError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature { obj.insert("temperature".to_string(), json!(t)); }
            if let Some(t) = request.max_tokens { obj.insert("max_tokens".to_string(), json!(t)); }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamServiceError::Llm(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(text);
            return Err(UpstreamServiceError::Llm(format!(
                "HTTP {}: {}",
                status, detail
            )));
        }

        let payload: CompletionResponse = res
            .json()
            .await
            .map_err(|e| UpstreamServiceError::Llm(format!("malformed response: {}", e)))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamServiceError::Llm("response contained no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::llm::types::ChatMessage;

    fn settings_for(server: &MockServer) -> LlmSettings {
        LlmSettings {
            base_url: format!("{}/openai/v1", server.uri()),
            timeout_secs: 5,
            ..LlmSettings::default()
        }
    }

    #[tokio::test]
    async fn sends_openai_style_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": "llama-3.1-8b-instant",
                "temperature": 0.5,
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "index": 0, "message": { "role": "assistant", "content": "Hi there" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&settings_for(&server), "gsk_test".to_string()).expect("client");
        let request = ChatRequest::new(vec![ChatMessage::system("be brief"), ChatMessage::user("hello")])
            .with_temperature(0.5);

        let answer = provider.chat(request).await.expect("chat should succeed");
        assert_eq!(answer, "Hi there");
    }

    #[tokio::test]
    async fn rate_limit_is_an_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached", "type": "tokens" }
            })))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&settings_for(&server), "gsk_test".to_string()).expect("client");
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("hello")]))
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamServiceError::Llm(_)));
        assert!(err.to_string().contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&settings_for(&server), "gsk_test".to_string()).expect("client");
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("hello")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no message content"));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let provider = GroqProvider::new(&settings_for(&server), "gsk_test".to_string()).expect("client");
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("hello")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }
}
