#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use review_rag::core::config::settings::ServerSettings;
use review_rag::core::errors::UpstreamServiceError;
use review_rag::documents::{Document, ProductReview};
use review_rag::embedding::Embedder;
use review_rag::ingest::{CollectionHandle, VectorIngestor};
use review_rag::llm::{ChatRequest, LlmProvider, Role};
use review_rag::rag::prompts::CONTEXTUALIZE_SYSTEM_PROMPT;
use review_rag::rag::{ChainOptions, RetrievalStages};
use review_rag::server;
use review_rag::state::AppState;
use review_rag::vector::InMemoryVectorStore;

const TOPICS: [&str; 3] = ["battery", "camera", "display"];

/// Embeds text as keyword counts over a fixed topic list.
pub struct TopicEmbedder;

#[async_trait]
impl Embedder for TopicEmbedder {
    fn dimension(&self) -> usize {
        TOPICS.len()
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, UpstreamServiceError> {
        Ok(inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                TOPICS
                    .iter()
                    .map(|topic| lower.matches(topic).count() as f32 + 0.01)
                    .collect()
            })
            .collect())
    }
}

/// Echoes the question when reformulating and names the top product when answering.
pub struct ProductNamingLlm {
    pub calls: AtomicUsize,
}

impl ProductNamingLlm {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for ProductNamingLlm {
    fn name(&self) -> &str {
        "fake"
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, UpstreamServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let system = request
            .messages
            .first()
            .filter(|message| message.role == Role::System)
            .map(|message| message.content.clone())
            .unwrap_or_default();
        let question = request
            .messages
            .last()
            .map(|message| message.content.clone())
            .unwrap_or_default();

        if system == CONTEXTUALIZE_SYSTEM_PROMPT {
            return Ok(question);
        }

        let product = system
            .lines()
            .find_map(|line| line.split_once("Product: ").map(|(_, title)| title.to_string()));
        Ok(match product {
            Some(title) => format!("Reviewers recommend the {} for: {}", title, question),
            None => "I could not find any reviews about that.".to_string(),
        })
    }
}

pub struct UnreachableLlm;

#[async_trait]
impl LlmProvider for UnreachableLlm {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<String, UpstreamServiceError> {
        Err(UpstreamServiceError::Llm("connection refused".to_string()))
    }
}

pub fn review(title: &str, text: &str) -> Document {
    Document::from_review(ProductReview {
        product_title: title.to_string(),
        review: text.to_string(),
    })
}

pub fn catalog() -> Vec<Document> {
    vec![
        review("Galaxy M32", "Great battery life, lasts two days"),
        review("Redmi Note 10", "Camera is sharp in daylight"),
        review("Moto G40", "Display is bright and smooth"),
    ]
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

/// Router over an in-memory collection holding `documents`.
pub async fn app_with(llm: Arc<dyn LlmProvider>, documents: Vec<Document>) -> TestApp {
    let embedder: Arc<dyn Embedder> = Arc::new(TopicEmbedder);
    let store = Arc::new(InMemoryVectorStore::new("flipkart"));

    let collection: CollectionHandle = VectorIngestor::new(embedder.clone(), store.clone(), 8)
        .ingest(documents, false)
        .await
        .expect("ingest");

    let stages = Arc::new(RetrievalStages::new(
        llm,
        embedder,
        store,
        ChainOptions {
            top_k: 3,
            temperature: 0.5,
            max_tokens: None,
        },
    ));
    let server_settings = ServerSettings {
        max_message_chars: 200,
        ..ServerSettings::default()
    };
    let state = AppState::from_parts(server_settings, stages, 0, collection).expect("state");

    TestApp {
        router: server::router(state.clone()),
        state,
    }
}
