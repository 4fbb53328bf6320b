//! Core traits for docrag components.
//!
//! These seams separate the orchestration logic from its external
//! collaborators:
//!
//! - [`Extractor`]: file → ordered pages
//! - [`EmbeddingProvider`]: text → fixed-dimension vectors (remote service)
//! - [`LlmProvider`]: grounded prompt → completion (remote service)
//! - [`VectorIndex`]: nearest-neighbor storage and search (remote service)
//! - [`DocumentStore`]: document/chunk persistence (external boundary)
//!
//! Components hold `Arc<dyn ...>` handles so per-request pipeline instances
//! are cheap to construct and safe to run concurrently.

use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::error::{EmbedError, ExtractError, GenerateError, IndexError, StoreError};
use crate::types::{
    Chunk, DocumentRecord, DocumentStatus, Extraction, FileType, Generation, IndexHit, IndexPoint,
    SearchParams,
};

// ============================================================================
// Content Extraction
// ============================================================================

/// Trait for extracting pages of cleaned text from a file.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The source format this extractor handles.
    fn format(&self) -> FileType;

    /// Extract ordered pages from a file.
    ///
    /// Decode errors inside readable containers degrade to replacement
    /// characters; a fundamentally unreadable container fails with
    /// [`ExtractError::Unreadable`].
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for an external embedding service.
///
/// Implementations perform no internal retry: a failed call surfaces as
/// [`EmbedError`] and the caller decides whether the attempt fails.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts. Order-preserving: one vector per input, in
    /// input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

// ============================================================================
// Generation
// ============================================================================

/// Trait for an external LLM completion service.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Run a completion with a system instruction and a user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Generation, GenerateError>;
}

// ============================================================================
// Vector Index
// ============================================================================

/// Trait for the external vector index.
///
/// The index is an opaque nearest-neighbor service keyed by collection name
/// with a fixed vector dimension and cosine similarity. Multi-document
/// filters are logical OR: a hit matches when its `document_id` equals any
/// id in the filter set. Hit ordering is index-native descending similarity,
/// but callers re-sort defensively rather than trusting it.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Create the collection if it does not exist. Idempotent.
    async fn ensure_collection(&self, dimension: usize) -> Result<(), IndexError>;

    /// Insert or replace points.
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), IndexError>;

    /// Filtered similarity search.
    async fn search(&self, params: &SearchParams) -> Result<Vec<IndexHit>, IndexError>;

    /// Delete every point belonging to a document.
    async fn delete_by_document(&self, document_id: &str) -> Result<(), IndexError>;

    /// Total number of stored points.
    async fn count(&self) -> Result<u64, IndexError>;
}

// ============================================================================
// Document Persistence
// ============================================================================

/// Trait for the external document/chunk persistence boundary.
///
/// The pipeline consumes this through status callbacks; it never owns the
/// records. `update_status` enforces the lifecycle transitions declared on
/// [`DocumentStatus`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a new record.
    async fn create(&self, record: DocumentRecord) -> Result<(), StoreError>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<DocumentRecord>, StoreError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Look up a record by file hash (dedup key).
    async fn find_by_hash(&self, file_hash: &str) -> Result<Option<DocumentRecord>, StoreError>;

    /// Transition a document's lifecycle state, updating counts and the
    /// error message as appropriate for the target state.
    async fn update_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        chunk_count: u32,
        page_count: u32,
        error_message: Option<String>,
    ) -> Result<(), StoreError>;

    /// Persist the chunk rows for a document, replacing any prior set.
    async fn store_chunks(&self, id: Uuid, chunks: &[Chunk]) -> Result<(), StoreError>;

    /// Fetch the chunk rows for a document in chunk_index order.
    async fn get_chunks(&self, id: Uuid) -> Result<Vec<Chunk>, StoreError>;

    /// Delete a record and its chunk rows. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}
