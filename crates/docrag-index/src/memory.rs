//! In-memory vector index for testing without a Qdrant instance.

use async_trait::async_trait;
use docrag_core::{IndexError, IndexHit, IndexPoint, SearchParams, VectorIndex};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Brute-force in-memory index.
///
/// Stores points in a map and searches with exact cosine similarity. Not
/// suitable for production scale, but exercises the exact same contract as
/// the Qdrant client, including OR filter semantics and score thresholds.
pub struct MemoryIndex {
    points: Arc<RwLock<HashMap<Uuid, IndexPoint>>>,
    dimension: Arc<RwLock<Option<usize>>>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: Arc::new(RwLock::new(HashMap::new())),
            dimension: Arc::new(RwLock::new(None)),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(&self, dimension: usize) -> Result<(), IndexError> {
        let mut dim = self.dimension.write().await;
        if dim.is_none() {
            *dim = Some(dimension);
            debug!(dimension, "memory index collection created");
        }
        Ok(())
    }

    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), IndexError> {
        let mut store = self.points.write().await;
        let count = points.len();
        for point in points {
            store.insert(point.id, point);
        }
        debug!(count, "upserted points");
        Ok(())
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<IndexHit>, IndexError> {
        let store = self.points.read().await;

        let mut hits: Vec<IndexHit> = store
            .values()
            .filter(|point| match &params.document_filter {
                // OR semantics: any listed document id matches.
                Some(ids) => ids.iter().any(|id| *id == point.payload.document_id),
                None => true,
            })
            .map(|point| IndexHit {
                id: point.id.to_string(),
                score: Self::cosine_similarity(&params.vector, &point.vector),
                payload: point.payload.clone(),
            })
            .filter(|hit| hit.score >= params.score_threshold)
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(params.top_k);

        Ok(hits)
    }

    async fn delete_by_document(&self, document_id: &str) -> Result<(), IndexError> {
        let mut store = self.points.write().await;
        let before = store.len();
        store.retain(|_, point| point.payload.document_id != document_id);
        debug!(
            deleted = before - store.len(),
            document_id, "deleted points by document"
        );
        Ok(())
    }

    async fn count(&self) -> Result<u64, IndexError> {
        Ok(self.points.read().await.len() as u64)
    }
}
