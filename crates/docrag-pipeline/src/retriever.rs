//! Query-time retrieval.

use docrag_core::{RagConfig, Result, RetrievedChunk, SearchParams, VectorIndex};
use std::sync::Arc;
use tracing::debug;

use crate::embedder::DocumentEmbedder;

/// Embeds a query, searches the index, and ranks the hits.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<DocumentEmbedder>,
    config: RagConfig,
}

impl Retriever {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<DocumentEmbedder>,
        config: RagConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            config,
        }
    }

    /// Retrieve ranked chunks for a query.
    ///
    /// Omitted parameters fall back to the configuration snapshot. Zero hits
    /// is a valid outcome: the empty list tells the caller nothing relevant
    /// exists, it is not an error.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: Option<usize>,
        score_threshold: Option<f32>,
        document_filter: Option<Vec<String>>,
    ) -> Result<Vec<RetrievedChunk>> {
        let top_k = top_k.unwrap_or(self.config.top_k);
        let score_threshold = score_threshold.unwrap_or(self.config.score_threshold);

        let vector = self.embedder.embed_query(query).await?;

        let hits = self
            .index
            .search(&SearchParams {
                vector,
                top_k,
                score_threshold,
                document_filter,
            })
            .await?;

        let mut chunks: Vec<RetrievedChunk> = hits.into_iter().map(Into::into).collect();

        // The index already orders by similarity, but that ordering is not a
        // guarantee worth relying on; re-sort as a correctness safety net.
        chunks.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            hits = chunks.len(),
            top_k, "retrieved chunks for query"
        );
        Ok(chunks)
    }
}
