//! Batching wrapper over an embedding provider.

use docrag_core::{EmbedError, EmbeddingProvider};
use std::sync::Arc;
use tracing::debug;

/// Embeds chunk texts and queries through an external provider, splitting
/// large inputs into fixed-size sub-batches to respect service limits.
///
/// Sub-batches are issued sequentially, not fanned out, to stay inside
/// provider rate limits; output order always corresponds to input order.
pub struct DocumentEmbedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl DocumentEmbedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    /// Embedding dimension of the underlying provider.
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Model name of the underlying provider.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed a list of texts, one vector per input in input order.
    ///
    /// Empty input returns empty output without calling the service.
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            debug!(batch = batch.len(), "embedding sub-batch");
            let vectors = self.provider.embed(batch).await?;
            if vectors.len() != batch.len() {
                return Err(EmbedError::Response(format!(
                    "provider returned {} vectors for {} inputs",
                    vectors.len(),
                    batch.len()
                )));
            }
            all.extend(vectors);
        }

        Ok(all)
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let texts = [query.to_string()];
        let mut vectors = self.provider.embed(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Response("empty embedding result".to_string()))
    }
}
