//! Conversational retrieval chain.
//!
//! Per query: reformulate against the session history, retrieve the top-k
//! reviews for the standalone question, answer from those reviews, then
//! append the exchange to the session history.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::context_builder::{format_context, source_titles};
use super::prompts::{qa_system_prompt, CONTEXTUALIZE_SYSTEM_PROMPT};
use crate::core::config::settings::{LlmSettings, RagSettings};
use crate::core::errors::UpstreamServiceError;
use crate::embedding::Embedder;
use crate::history::{HistoryStore, SessionGuard};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::vector::{ScoredDocument, VectorStore};

/// The stages of one chain invocation.
#[async_trait]
pub trait ChainStages: Send + Sync {
    /// Standalone form of `query`. Returns `query` unchanged when `history` is empty.
    async fn reformulate(
        &self,
        history: &[ChatMessage],
        query: &str,
    ) -> Result<String, UpstreamServiceError>;

    /// Nearest reviews for a standalone query, best first.
    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>, UpstreamServiceError>;

    /// Answer `query` from `documents`; the model output is returned verbatim.
    async fn answer_with_context(
        &self,
        history: &[ChatMessage],
        query: &str,
        documents: &[ScoredDocument],
    ) -> Result<String, UpstreamServiceError>;
}

#[derive(Debug, Clone)]
pub struct ChainOptions {
    pub top_k: usize,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ChainOptions {
    pub fn from_settings(rag: &RagSettings, llm: &LlmSettings) -> Self {
        Self {
            top_k: rag.top_k,
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        }
    }
}

/// [`ChainStages`] backed by the hosted LLM, embedder and vector store.
pub struct RetrievalStages {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    options: ChainOptions,
}

impl RetrievalStages {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        options: ChainOptions,
    ) -> Self {
        Self {
            llm,
            embedder,
            store,
            options,
        }
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        ChatRequest::new(messages)
            .with_temperature(self.options.temperature)
            .with_max_tokens(self.options.max_tokens)
    }
}

#[async_trait]
impl ChainStages for RetrievalStages {
    async fn reformulate(
        &self,
        history: &[ChatMessage],
        query: &str,
    ) -> Result<String, UpstreamServiceError> {
        if history.is_empty() {
            return Ok(query.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(CONTEXTUALIZE_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(query));

        let rewritten = self.llm.chat(self.request(messages)).await?;
        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            return Ok(query.to_string());
        }
        Ok(rewritten.to_string())
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<ScoredDocument>, UpstreamServiceError> {
        let vector = self.embedder.embed_query(query).await?;
        self.store.search(&vector, self.options.top_k).await
    }

    async fn answer_with_context(
        &self,
        history: &[ChatMessage],
        query: &str,
        documents: &[ScoredDocument],
    ) -> Result<String, UpstreamServiceError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(qa_system_prompt(&format_context(documents))));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(query));

        self.llm.chat(self.request(messages)).await
    }
}

/// Outcome of one chain invocation.
#[derive(Debug, Clone)]
pub struct ChainResponse {
    pub answer: String,
    pub standalone_query: String,
    pub sources: Vec<String>,
}

pub struct ConversationalChain {
    stages: Arc<dyn ChainStages>,
    history: HistoryStore,
    history_window: usize,
}

impl ConversationalChain {
    pub fn new(stages: Arc<dyn ChainStages>, history: HistoryStore, history_window: usize) -> Self {
        Self {
            stages,
            history,
            history_window,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Answers `query` for `session_id`.
    ///
    /// The session stays locked for the whole call. The history is only
    /// extended when every stage succeeds; a session whose first query fails
    /// is not kept.
    pub async fn invoke(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<ChainResponse, UpstreamServiceError> {
        let session = self.history.lock(session_id).await;
        let result = self.run(session, session_id, query).await;
        if result.is_err() {
            self.history.discard_if_empty(session_id).await;
        }
        result
    }

    async fn run(
        &self,
        mut session: SessionGuard,
        session_id: &str,
        query: &str,
    ) -> Result<ChainResponse, UpstreamServiceError> {
        let started = Instant::now();
        let turns = recent_turns(session.turns(), self.history_window);

        let standalone_query = self.stages.reformulate(turns, query).await?;
        tracing::debug!("Session {} standalone query: {}", session_id, standalone_query);

        let documents = self.stages.retrieve(&standalone_query).await?;
        tracing::debug!(
            "Session {} retrieved {} documents",
            session_id,
            documents.len()
        );

        let answer = self
            .stages
            .answer_with_context(turns, query, &documents)
            .await?;

        session.append_exchange(query, answer.clone());
        tracing::info!(
            "Answered session {} in {} ms",
            session_id,
            started.elapsed().as_millis()
        );

        Ok(ChainResponse {
            answer,
            standalone_query,
            sources: source_titles(&documents),
        })
    }
}

fn recent_turns(turns: &[ChatMessage], window: usize) -> &[ChatMessage] {
    if window == 0 || turns.len() <= window {
        turns
    } else {
        &turns[turns.len() - window..]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::documents::{Document, ProductReview};
    use crate::llm::Role;
    use crate::vector::InMemoryVectorStore;

    /// Replays scripted replies and records every request.
    struct ScriptedLlm {
        replies: Mutex<Vec<Result<String, UpstreamServiceError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<String, UpstreamServiceError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: ChatRequest) -> Result<String, UpstreamServiceError> {
            self.requests.lock().expect("lock").push(request);
            self.replies
                .lock()
                .expect("lock")
                .pop()
                .unwrap_or_else(|| Err(UpstreamServiceError::Llm("no scripted reply".to_string())))
        }
    }

    /// Two-dimensional embedding: [mentions battery, mentions camera].
    struct TopicEmbedder;

    #[async_trait]
    impl Embedder for TopicEmbedder {
        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, UpstreamServiceError> {
            Ok(inputs
                .iter()
                .map(|text| {
                    let text = text.to_lowercase();
                    vec![
                        if text.contains("battery") { 1.0 } else { 0.1 },
                        if text.contains("camera") { 1.0 } else { 0.1 },
                    ]
                })
                .collect())
        }
    }

    async fn seeded_store() -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new("flipkart"));
        let embedder = TopicEmbedder;
        for (title, review) in [
            ("Galaxy M32", "Great battery life, lasts two days"),
            ("Redmi 9", "The camera is sharp in daylight"),
        ] {
            let doc = Document::from_review(ProductReview {
                product_title: title.to_string(),
                review: review.to_string(),
            });
            let vector = embedder.embed_query(&doc.content).await.expect("embed");
            store.upsert(&doc, &vector).await.expect("upsert");
        }
        store
    }

    fn options() -> ChainOptions {
        ChainOptions {
            top_k: 1,
            temperature: 0.5,
            max_tokens: None,
        }
    }

    async fn chain_with(llm: Arc<ScriptedLlm>, history_window: usize) -> ConversationalChain {
        let stages = RetrievalStages::new(llm, Arc::new(TopicEmbedder), seeded_store().await, options());
        ConversationalChain::new(Arc::new(stages), HistoryStore::new(), history_window)
    }

    #[tokio::test]
    async fn first_query_skips_reformulation() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok("The Galaxy M32.".to_string())]));
        let chain = chain_with(llm.clone(), 0).await;

        let response = chain
            .invoke("s1", "Which phone has good battery?")
            .await
            .expect("chain should answer");

        assert_eq!(response.answer, "The Galaxy M32.");
        assert_eq!(response.standalone_query, "Which phone has good battery?");
        assert_eq!(response.sources, vec!["Galaxy M32"]);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        let system = &requests[0].messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("Product: Galaxy M32"));
        assert!(!system.content.contains("Redmi 9"));
        assert_eq!(requests[0].temperature, Some(0.5));
    }

    #[tokio::test]
    async fn follow_up_is_reformulated_with_history() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("The Galaxy M32.".to_string()),
            Ok("  How good is the camera on the Galaxy M32?  ".to_string()),
            Ok("Reviews only praise its battery.".to_string()),
        ]));
        let chain = chain_with(llm.clone(), 0).await;

        chain.invoke("s1", "Which phone has good battery?").await.expect("first");
        let response = chain.invoke("s1", "How is its camera?").await.expect("second");

        assert_eq!(response.standalone_query, "How good is the camera on the Galaxy M32?");
        assert_eq!(response.sources, vec!["Redmi 9"]);

        let requests = llm.requests();
        assert_eq!(requests.len(), 3);
        let reformulation = &requests[1].messages;
        assert_eq!(reformulation[0].content, CONTEXTUALIZE_SYSTEM_PROMPT);
        assert_eq!(reformulation[1].content, "Which phone has good battery?");
        assert_eq!(reformulation[2].content, "The Galaxy M32.");
        assert_eq!(reformulation[3].content, "How is its camera?");

        // The answer prompt carries the original question, not the rewrite.
        let answer_messages = &requests[2].messages;
        assert_eq!(answer_messages.last().expect("user").content, "How is its camera?");

        assert_eq!(chain.history().get_history("s1").await.len(), 4);
    }

    #[tokio::test]
    async fn blank_rewrite_falls_back_to_original_query() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("Galaxy M32".to_string()),
            Ok("   ".to_string()),
            Ok("Still the Galaxy M32".to_string()),
        ]));
        let chain = chain_with(llm, 0).await;

        chain.invoke("s1", "battery?").await.expect("first");
        let response = chain.invoke("s1", "any battery alternatives?").await.expect("second");
        assert_eq!(response.standalone_query, "any battery alternatives?");
    }

    #[tokio::test]
    async fn llm_failure_leaves_history_untouched() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(UpstreamServiceError::Llm(
            "connection refused".to_string(),
        ))]));
        let chain = chain_with(llm, 0).await;

        let err = chain.invoke("s1", "battery?").await.unwrap_err();
        assert!(matches!(err, UpstreamServiceError::Llm(_)));
        assert!(chain.history().get_history("s1").await.is_empty());
    }

    #[tokio::test]
    async fn history_window_limits_prompt_turns() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok("a1".to_string()),
            Ok("rewritten".to_string()),
            Ok("a2".to_string()),
        ]));
        let chain = chain_with(llm.clone(), 1).await;

        chain.invoke("s1", "q1").await.expect("first");
        chain.invoke("s1", "q2").await.expect("second");

        let reformulation = &llm.requests()[1].messages;
        assert_eq!(reformulation.len(), 3);
        assert_eq!(reformulation[1].content, "a1");
        // Full history is still retained.
        assert_eq!(chain.history().get_history("s1").await.len(), 4);
    }

    #[test]
    fn recent_turns_takes_the_tail() {
        let turns = vec![
            ChatMessage::user("1"),
            ChatMessage::assistant("2"),
            ChatMessage::user("3"),
        ];
        assert_eq!(recent_turns(&turns, 0).len(), 3);
        assert_eq!(recent_turns(&turns, 5).len(), 3);
        let tail = recent_turns(&turns, 2);
        assert_eq!(tail[0].content, "2");
        assert_eq!(tail[1].content, "3");
    }
}
