use std::sync::Arc;

use crate::core::config::settings::{ServerSettings, VectorBackend};
use crate::core::config::AppConfig;
use crate::documents::{load_reviews, ColumnNames};
use crate::embedding::{Embedder, HuggingFaceEmbedder};
use crate::history::HistoryStore;
use crate::ingest::{CollectionHandle, VectorIngestor};
use crate::llm::{GroqProvider, LlmProvider};
use crate::metrics::Metrics;
use crate::rag::{ChainOptions, ChainStages, ConversationalChain, RetrievalStages};
use crate::vector::{AstraDbStore, InMemoryVectorStore, VectorStore};

pub mod error;

use error::InitializationError;

/// Clients for the hosted services behind a query.
#[derive(Clone)]
pub struct Services {
    pub llm: Arc<dyn LlmProvider>,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
}

impl Services {
    pub fn connect(config: &AppConfig) -> Result<Self, InitializationError> {
        let settings = &config.settings;
        let credentials = &config.credentials;

        let llm = GroqProvider::new(&settings.llm, credentials.groq_api_key.clone())
            .map_err(InitializationError::Client)?;
        let embedder = HuggingFaceEmbedder::new(&settings.embedding, credentials.hf_token.clone())
            .map_err(InitializationError::Client)?;
        let store: Arc<dyn VectorStore> = match settings.vector_store.backend {
            VectorBackend::Astra => Arc::new(
                AstraDbStore::new(&settings.vector_store, credentials)
                    .map_err(InitializationError::Client)?,
            ),
            VectorBackend::Memory => {
                Arc::new(InMemoryVectorStore::new(settings.vector_store.collection.clone()))
            }
        };

        tracing::info!(
            "Using {} model {} with embeddings from {} and a {:?} collection {}",
            llm.name(),
            llm.model(),
            embedder.endpoint(),
            settings.vector_store.backend,
            store.collection()
        );

        Ok(Self {
            llm: Arc::new(llm),
            embedder: Arc::new(embedder),
            store,
        })
    }
}

/// Shared state for every route.
pub struct AppState {
    pub server: ServerSettings,
    pub chain: Arc<ConversationalChain>,
    pub metrics: Arc<Metrics>,
    pub collection: CollectionHandle,
}

impl AppState {
    /// Connects the hosted services and prepares the review collection.
    ///
    /// With `ingest.on_startup` the CSV is embedded and upserted before the
    /// server starts; otherwise the existing collection is used as is.
    pub async fn initialize(config: &AppConfig) -> Result<Arc<Self>, InitializationError> {
        let settings = &config.settings;
        let services = Services::connect(config)?;

        let ingestor = VectorIngestor::new(
            services.embedder.clone(),
            services.store.clone(),
            settings.ingest.batch_size,
        );
        let collection = if settings.ingest.on_startup {
            let documents = load_reviews(
                &settings.ingest.csv_path,
                &ColumnNames::from(&settings.ingest),
            )?;
            ingestor.ingest(documents, false).await?
        } else {
            if settings.vector_store.backend == VectorBackend::Memory {
                tracing::warn!(
                    "In-memory collection without ingest.on_startup; answers will have no reviews"
                );
            }
            ingestor.ingest(Vec::new(), true).await?
        };

        let stages = Arc::new(RetrievalStages::new(
            services.llm,
            services.embedder,
            services.store,
            ChainOptions::from_settings(&settings.rag, &settings.llm),
        ));

        Self::from_parts(
            settings.server.clone(),
            stages,
            settings.rag.history_window,
            collection,
        )
    }

    /// Builds the state around already constructed chain stages.
    pub fn from_parts(
        server: ServerSettings,
        stages: Arc<dyn ChainStages>,
        history_window: usize,
        collection: CollectionHandle,
    ) -> Result<Arc<Self>, InitializationError> {
        let chain = ConversationalChain::new(stages, HistoryStore::new(), history_window);
        Ok(Arc::new(AppState {
            server,
            chain: Arc::new(chain),
            metrics: Arc::new(Metrics::new()?),
            collection,
        }))
    }
}
