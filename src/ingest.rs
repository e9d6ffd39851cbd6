//! Vector ingestion: embed review documents and upsert them into the collection.

use std::sync::Arc;

use futures_util::future::try_join_all;
use thiserror::Error;

use crate::core::errors::UpstreamServiceError;
use crate::documents::Document;
use crate::embedding::Embedder;
use crate::vector::VectorStore;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("failed to prepare collection {collection}: {source}")]
    Collection {
        collection: String,
        #[source]
        source: UpstreamServiceError,
    },
    /// Embedding is requested per batch; the failing document is one of `document_ids`.
    #[error("failed to embed documents [{}]: {source}", .document_ids.join(", "))]
    Embedding {
        document_ids: Vec<String>,
        #[source]
        source: UpstreamServiceError,
    },
    #[error("failed to upsert document {document_id}: {source}")]
    Upsert {
        document_id: String,
        #[source]
        source: UpstreamServiceError,
    },
}

/// The collection an ingestion run attached to or wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    pub name: String,
    /// Documents written during this run; zero when attaching to an existing collection.
    pub upserted: usize,
    pub loaded_existing: bool,
}

pub struct VectorIngestor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl VectorIngestor {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, batch_size: usize) -> Self {
        Self {
            embedder,
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Attach to the collection, or embed and upsert every document into it.
    ///
    /// With `load_existing` nothing is embedded or written. Otherwise the first
    /// failing document aborts the run; documents upserted before it stay in the
    /// collection.
    pub async fn ingest(
        &self,
        documents: Vec<Document>,
        load_existing: bool,
    ) -> Result<CollectionHandle, IngestionError> {
        let collection = self.store.collection().to_string();

        if load_existing {
            tracing::info!("Attaching to existing collection {}", collection);
            return Ok(CollectionHandle {
                name: collection,
                upserted: 0,
                loaded_existing: true,
            });
        }

        self.store
            .ensure_collection(self.embedder.dimension())
            .await
            .map_err(|source| IngestionError::Collection {
                collection: collection.clone(),
                source,
            })?;

        let total = documents.len();
        let mut upserted = 0;
        for batch in documents.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|doc| doc.content.clone()).collect();
            let vectors = self
                .embedder
                .embed(&texts)
                .await
                .map_err(|source| IngestionError::Embedding {
                    document_ids: batch.iter().map(|doc| doc.id.clone()).collect(),
                    source,
                })?;

            try_join_all(batch.iter().zip(vectors.iter()).map(|(doc, vector)| async move {
                self.store
                    .upsert(doc, vector)
                    .await
                    .map_err(|source| IngestionError::Upsert {
                        document_id: doc.id.clone(),
                        source,
                    })
            }))
            .await?;

            upserted += batch.len();
            tracing::info!("Ingested {}/{} documents into {}", upserted, total, collection);
        }

        Ok(CollectionHandle {
            name: collection,
            upserted,
            loaded_existing: false,
        })
    }
}
