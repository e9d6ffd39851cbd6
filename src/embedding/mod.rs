//! Text embedding clients.

mod huggingface;

pub use huggingface::HuggingFaceEmbedder;

use async_trait::async_trait;

use crate::core::errors::UpstreamServiceError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts; the output preserves input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, UpstreamServiceError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, UpstreamServiceError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            UpstreamServiceError::Embedding("empty response for query embedding".to_string())
        })
    }
}

/// Checks that a batch response lines up with its request.
pub(crate) fn check_batch(
    vectors: &[Vec<f32>],
    expected_len: usize,
    dimension: usize,
) -> Result<(), UpstreamServiceError> {
    if vectors.len() != expected_len {
        return Err(UpstreamServiceError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected_len,
            vectors.len()
        )));
    }
    if let Some((idx, bad)) = vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != dimension)
    {
        return Err(UpstreamServiceError::Embedding(format!(
            "embedding {} has dimension {}, expected {}",
            idx,
            bad.len(),
            dimension
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_batch_accepts_matching_shapes() {
        let vectors = vec![vec![0.0; 4], vec![1.0; 4]];
        assert!(check_batch(&vectors, 2, 4).is_ok());
    }

    #[test]
    fn check_batch_rejects_count_mismatch() {
        let err = check_batch(&[vec![0.0; 4]], 2, 4).unwrap_err();
        assert!(err.to_string().contains("expected 2 embeddings, got 1"));
    }

    #[test]
    fn check_batch_rejects_wrong_dimension() {
        let err = check_batch(&[vec![0.0; 4], vec![0.0; 3]], 2, 4).unwrap_err();
        assert!(err.to_string().contains("embedding 1 has dimension 3"));
    }
}
