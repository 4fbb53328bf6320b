//! Document lifecycle management.
//!
//! Glue between the pipeline and the external persistence boundary:
//! hash-based dedup at upload, the `pending → processing → ready | failed`
//! state machine around ingestion, two-phase deletion, and conversation
//! plumbing for queries.

use docrag_core::{
    DocumentRecord, DocumentStatus, DocumentStore, Error, FileType, IngestError, IngestStage,
    QueryOutcome, Result, StoreError, VectorIndex,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::hash::compute_file_hash;
use crate::pipeline::RagPipeline;
use crate::state::ConversationLog;

/// Messages of history handed to the pipeline per query.
const HISTORY_LIMIT: usize = 20;

/// Coordinates document records, vectors, and the pipeline.
pub struct DocumentManager {
    store: Arc<dyn DocumentStore>,
    index: Arc<dyn VectorIndex>,
    pipeline: Arc<RagPipeline>,
}

impl DocumentManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        index: Arc<dyn VectorIndex>,
        pipeline: Arc<RagPipeline>,
    ) -> Self {
        Self {
            store,
            index,
            pipeline,
        }
    }

    /// Register an upload: hash the file, reject duplicates, persist a
    /// `Pending` record.
    ///
    /// Two uploads with identical bytes must not both ingest; the second is
    /// rejected with a conflict naming the existing document.
    pub async fn register(
        &self,
        path: &Path,
        name: &str,
        file_type: FileType,
    ) -> Result<DocumentRecord> {
        let metadata = tokio::fs::metadata(path).await?;
        let hash_path = PathBuf::from(path);
        let file_hash = tokio::task::spawn_blocking(move || compute_file_hash(&hash_path))
            .await
            .map_err(|e| Error::Other(format!("hash task failed: {e}")))??;

        if let Some(existing) = self.store.find_by_hash(&file_hash).await? {
            info!(
                name,
                existing = %existing.name,
                "duplicate upload rejected"
            );
            return Err(StoreError::Duplicate {
                id: existing.id,
                name: existing.name,
            }
            .into());
        }

        let record = DocumentRecord::new(name.to_string(), file_type, metadata.len(), file_hash);
        self.store.create(record.clone()).await?;
        info!(id = %record.id, name, "document registered");
        Ok(record)
    }

    /// Run ingestion for a registered document.
    ///
    /// Idempotent under at-least-once delivery: a document that is already
    /// `Ready` is a safe no-op. A failure at any stage records `Failed` with
    /// the stage message and propagates; there is no automatic retry.
    /// Reprocessing a `Failed` document requires the source file to still
    /// exist.
    pub async fn process(&self, document_id: Uuid, path: &Path) -> Result<()> {
        let record = self
            .store
            .get(document_id)
            .await?
            .ok_or(StoreError::NotFound(document_id))?;

        if record.status == DocumentStatus::Ready {
            info!(id = %document_id, "document already ready; skipping");
            return Ok(());
        }

        if record.status == DocumentStatus::Failed && !path.exists() {
            return Err(Error::Other(format!(
                "cannot reprocess {}: source file no longer exists",
                record.name
            )));
        }

        self.store
            .update_status(document_id, DocumentStatus::Processing, 0, 0, None)
            .await?;

        let id_str = document_id.to_string();
        let outcome = async {
            // Point ids are never reused, so stale vectors from a prior
            // ingestion must be purged before indexing fresh ones.
            self.index
                .delete_by_document(&id_str)
                .await
                .map_err(|e| Error::from(IngestError::new(IngestStage::Index, e)))?;

            self.pipeline
                .ingest_document(path, record.file_type, &id_str, &record.name)
                .await
                .map_err(Error::from)
        }
        .await;

        match outcome {
            Ok(report) => {
                // Vectors are already in the index; only now do chunk rows
                // and the ready status become visible.
                self.store.store_chunks(document_id, &report.chunks).await?;
                self.store
                    .update_status(
                        document_id,
                        DocumentStatus::Ready,
                        report.chunk_count,
                        report.page_count,
                        None,
                    )
                    .await?;
                info!(
                    id = %document_id,
                    chunks = report.chunk_count,
                    pages = report.page_count,
                    "ingestion complete"
                );
                Ok(())
            }
            Err(e) => {
                error!(id = %document_id, error = %e, "ingestion failed");
                self.store
                    .update_status(
                        document_id,
                        DocumentStatus::Failed,
                        0,
                        0,
                        Some(e.to_string()),
                    )
                    .await?;
                Err(e)
            }
        }
    }

    /// Delete a document's vectors and its record.
    ///
    /// The two deletions are separate external calls with no cross-system
    /// transaction. A vector-deletion failure is logged and the record
    /// delete still proceeds: an orphaned vector outlives its record rather
    /// than blocking cleanup.
    pub async fn remove(&self, document_id: Uuid) -> Result<bool> {
        let Some(record) = self.store.get(document_id).await? else {
            return Ok(false);
        };

        if let Err(e) = self.index.delete_by_document(&document_id.to_string()).await {
            warn!(
                id = %document_id,
                error = %e,
                "vector deletion failed; removing record anyway"
            );
        }

        let deleted = self.store.delete(document_id).await?;
        info!(id = %document_id, name = %record.name, "document removed");
        Ok(deleted)
    }

    /// Answer a question within a conversation, appending both turns.
    pub async fn ask(
        &self,
        conversation: &mut ConversationLog,
        question: &str,
        document_filter: Option<Vec<String>>,
    ) -> Result<QueryOutcome> {
        let history = conversation.history(HISTORY_LIMIT);
        let outcome = self
            .pipeline
            .query(question, &history, None, None, document_filter)
            .await?;

        conversation.push_user(question);
        conversation.push_assistant(&outcome);
        Ok(outcome)
    }
}
