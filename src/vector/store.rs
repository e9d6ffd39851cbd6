//! Storage interface for the review collection.

use async_trait::async_trait;

use crate::core::errors::UpstreamServiceError;
use crate::documents::Document;

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    /// Similarity score (higher = better).
    pub score: f32,
}

/// A named collection of (vector, content, metadata) entries.
///
/// Implementations should support:
/// - Idempotent collection creation
/// - Upsert keyed by document id
/// - Top-k similarity search, best match first
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection this store reads and writes.
    fn collection(&self) -> &str;

    /// Create the collection for vectors of `dimension` if it does not exist yet.
    async fn ensure_collection(&self, dimension: usize) -> Result<(), UpstreamServiceError>;

    /// Insert or replace the entry for `document.id`.
    async fn upsert(&self, document: &Document, embedding: &[f32]) -> Result<(), UpstreamServiceError>;

    /// Up to `limit` entries nearest to `query_embedding`. Tie order is backend-defined.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, UpstreamServiceError>;

    /// Number of entries in the collection.
    async fn count(&self) -> Result<usize, UpstreamServiceError>;
}
