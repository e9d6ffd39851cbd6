//! In-process vector store.
//!
//! Brute-force cosine search over entries held in memory. Selected with
//! `vector_store.backend: memory` for local runs without a database, and used
//! as the deterministic store in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{ScoredDocument, VectorStore};
use crate::core::errors::UpstreamServiceError;
use crate::documents::Document;
use crate::vector_math::rank_descending_by_cosine;

#[derive(Default)]
struct Collection {
    dimension: Option<usize>,
    /// Insertion order; equal scores rank in this order.
    entries: Vec<(Document, Vec<f32>)>,
    positions: HashMap<String, usize>,
}

pub struct InMemoryVectorStore {
    name: String,
    inner: RwLock<Collection>,
}

impl InMemoryVectorStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: RwLock::new(Collection::default()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn collection(&self) -> &str {
        &self.name
    }

    async fn ensure_collection(&self, dimension: usize) -> Result<(), UpstreamServiceError> {
        let mut inner = self.inner.write().await;
        match inner.dimension {
            Some(existing) if existing != dimension => Err(UpstreamServiceError::VectorStore(format!(
                "collection {} already exists with dimension {}, requested {}",
                self.name, existing, dimension
            ))),
            _ => {
                inner.dimension = Some(dimension);
                Ok(())
            }
        }
    }

    async fn upsert(&self, document: &Document, embedding: &[f32]) -> Result<(), UpstreamServiceError> {
        let mut inner = self.inner.write().await;
        if let Some(dimension) = inner.dimension {
            if embedding.len() != dimension {
                return Err(UpstreamServiceError::VectorStore(format!(
                    "vector for {} has dimension {}, collection expects {}",
                    document.id,
                    embedding.len(),
                    dimension
                )));
            }
        }

        let entry = (document.clone(), embedding.to_vec());
        let existing = inner.positions.get(&document.id).copied();
        match existing {
            Some(idx) => inner.entries[idx] = entry,
            None => {
                let idx = inner.entries.len();
                inner.positions.insert(document.id.clone(), idx);
                inner.entries.push(entry);
            }
        }
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, UpstreamServiceError> {
        let inner = self.inner.read().await;
        let candidates: Vec<&[f32]> = inner.entries.iter().map(|(_, v)| v.as_slice()).collect();

        let results = rank_descending_by_cosine(query_embedding, &candidates)
            .into_iter()
            .take(limit)
            .map(|(idx, score)| ScoredDocument {
                document: inner.entries[idx].0.clone(),
                score,
            })
            .collect();

        Ok(results)
    }

    async fn count(&self) -> Result<usize, UpstreamServiceError> {
        Ok(self.inner.read().await.entries.len())
    }
}
