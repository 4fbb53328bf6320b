//! Core types for docrag.
//!
//! This module contains the shared data structures used across the pipeline:
//!
//! ## Extraction
//! - [`FileType`]: Supported source formats
//! - [`Page`]: One logical page of cleaned text
//! - [`Extraction`]: Ordered pages plus source metadata
//!
//! ## Chunks
//! - [`Chunk`]: A token-bounded segment with provenance
//! - [`ChunkMetadata`]: Per-chunk metadata carried into the index payload
//!
//! ## Indexing and Retrieval
//! - [`IndexPoint`]: A vector plus payload ready for upsert
//! - [`SearchParams`] / [`IndexHit`]: Similarity search request/response
//! - [`RetrievedChunk`]: A hit mapped back to document coordinates
//!
//! ## Documents and Conversations
//! - [`DocumentStatus`] / [`DocumentRecord`]: Ingestion lifecycle
//! - [`ChatRole`] / [`ChatMessage`]: Bounded conversation history
//!
//! ## Results
//! - [`IngestionReport`]: Output of a successful ingestion
//! - [`QueryOutcome`] / [`SourceRef`]: Answer with citations
//! - [`Generation`] / [`TokenUsage`]: Normalized LLM output

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Extraction
// ============================================================================

/// Supported source file formats.
///
/// The file type is declared by the caller at upload time; it is not sniffed
/// from content. An unrecognized tag is a configuration error, not a runtime
/// fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Docx,
    Txt,
    Md,
}

impl FileType {
    /// Parse a file-type tag as received from the caller (`pdf|docx|txt|md`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            "md" | "markdown" => Some(Self::Md),
            _ => None,
        }
    }

    /// The canonical tag for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
            Self::Md => "md",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical page of extracted, cleaned text.
///
/// `page_number` is 1-based. Single-page formats (txt, md, docx) always
/// produce page 1; paginated formats number pages sequentially as the source
/// does. Extractors never fabricate page numbers beyond what the format
/// provides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub page_number: u32,
    /// Cleaned page text
    pub content: String,
    /// Format-specific metadata (dimensions, counts, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Result of extracting a file.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Ordered pages with non-empty content
    pub pages: Vec<Page>,
    /// Physical page count of the source (may exceed `pages.len()` when
    /// pages clean to empty)
    pub total_pages: u32,
    /// Source-level metadata
    pub metadata: HashMap<String, String>,
}

impl Extraction {
    /// All page content joined with blank-line separators.
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

// ============================================================================
// Chunks
// ============================================================================

/// Metadata attached to every chunk and carried into the index payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning document id
    pub document_id: String,
    /// Human-readable document name
    pub document_name: String,
    /// Global position within the document (0-based, dense)
    pub chunk_index: u32,
    /// Source page, if the format is paginated
    pub page_number: Option<u32>,
    /// Total chunks in the document; final only after global renumbering
    pub total_chunks: u32,
}

/// A token-bounded segment of a document.
///
/// `chunk_index` is globally unique and dense within a document (the values
/// form exactly `0..n`). A chunk never spans two pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text
    pub content: String,
    /// Global position within the document
    pub chunk_index: u32,
    /// Source page, if any
    pub page_number: Option<u32>,
    /// Token count, computed by the same tokenizer that bounds chunk size
    pub token_count: usize,
    /// Payload metadata
    pub metadata: ChunkMetadata,
}

// ============================================================================
// Indexing and Retrieval
// ============================================================================

/// Payload stored alongside each vector in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub document_id: String,
    pub document_name: String,
    pub chunk_index: u32,
    pub page_number: Option<u32>,
    pub content: String,
}

impl From<&Chunk> for ChunkPayload {
    fn from(chunk: &Chunk) -> Self {
        Self {
            document_id: chunk.metadata.document_id.clone(),
            document_name: chunk.metadata.document_name.clone(),
            chunk_index: chunk.chunk_index,
            page_number: chunk.page_number,
            content: chunk.content.clone(),
        }
    }
}

/// A vector with payload, ready to upsert into the index.
///
/// Point ids are generated fresh for every ingestion and never reused, so
/// stale vectors must be purged by document id before re-indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

/// Parameters for a similarity search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Query embedding
    pub vector: Vec<f32>,
    /// Maximum hits to return
    pub top_k: usize,
    /// Minimum similarity score to accept
    pub score_threshold: f32,
    /// Restrict hits to any of these document ids (logical OR); `None`
    /// searches all documents
    pub document_filter: Option<Vec<String>>,
}

/// A raw search hit from the index.
#[derive(Debug, Clone)]
pub struct IndexHit {
    /// Point id as reported by the index
    pub id: String,
    /// Native similarity score (higher = more relevant)
    pub score: f32,
    /// Stored payload
    pub payload: ChunkPayload,
}

/// A search hit mapped back to document coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub document_id: String,
    pub document_name: String,
    pub chunk_index: u32,
    pub page_number: Option<u32>,
    pub content: String,
    pub relevance_score: f32,
}

impl From<IndexHit> for RetrievedChunk {
    fn from(hit: IndexHit) -> Self {
        Self {
            document_id: hit.payload.document_id,
            document_name: hit.payload.document_name,
            chunk_index: hit.payload.chunk_index,
            page_number: hit.payload.page_number,
            content: hit.payload.content,
            relevance_score: hit.score,
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Token accounting normalized across providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt: u64,
    pub completion: u64,
    pub total: u64,
}

impl TokenUsage {
    /// Build a usage record, computing `total` when the provider does not
    /// report it directly.
    pub fn new(prompt: u64, completion: u64, total: Option<u64>) -> Self {
        Self {
            prompt,
            completion,
            total: total.unwrap_or(prompt + completion),
        }
    }
}

/// Normalized output of an LLM completion call.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Completion text
    pub content: String,
    /// Model that produced it
    pub model: String,
    /// Normalized usage accounting
    pub usage: TokenUsage,
}

// ============================================================================
// Conversations
// ============================================================================

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of conversation history handed to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Ingestion lifecycle of a document.
///
/// `Pending → Processing → Ready | Failed`. A document can reach `Failed`
/// from any non-terminal state and never silently disappears. `Failed` and
/// `Ready` documents re-enter `Processing` only through explicit
/// reprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Ready,
    Failed,
}

impl DocumentStatus {
    /// Whether the lifecycle has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    /// Whether a transition to `next` is allowed.
    pub fn can_transition(&self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        match (self, next) {
            (Pending, Processing) => true,
            (Processing, Ready) | (Processing, Failed) => true,
            // Failure is reachable from any non-terminal state.
            (Pending, Failed) => true,
            // Explicit reprocessing re-enters the pipeline.
            (Failed, Processing) | (Ready, Processing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Persistent record of an uploaded document (external entity, referenced
/// not owned).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique document identifier
    pub id: Uuid,
    /// Display name (original filename)
    pub name: String,
    /// Declared source format
    pub file_type: FileType,
    /// File size in bytes
    pub file_size: u64,
    /// sha-256 hex digest of the full file bytes; dedup key
    pub file_hash: String,
    /// Current lifecycle state
    pub status: DocumentStatus,
    /// Number of chunks; populated on `Ready`
    pub chunk_count: u32,
    /// Number of pages; populated on `Ready`
    pub page_count: u32,
    /// Failure description; populated on `Failed`
    pub error_message: Option<String>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a fresh `Pending` record for a validated upload.
    pub fn new(name: String, file_type: FileType, file_size: u64, file_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            file_type,
            file_size,
            file_hash,
            status: DocumentStatus::Pending,
            chunk_count: 0,
            page_count: 0,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Pipeline results
// ============================================================================

/// Output of a successful ingestion, handed to document persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionReport {
    pub chunk_count: u32,
    pub page_count: u32,
    pub chunks: Vec<Chunk>,
}

/// A citation attached to an answer.
///
/// `chunk_text` is a preview: the first 300 characters of the source chunk,
/// never the full content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub document_id: String,
    pub document_name: String,
    pub page_number: Option<u32>,
    pub chunk_text: String,
    pub relevance_score: f32,
}

/// Answer payload handed to conversation persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub model_used: String,
    pub tokens_used: TokenUsage,
}

/// Pipeline stage names used in ingestion error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Extract,
    Chunk,
    Embed,
    Index,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Extract => "extract",
            Self::Chunk => "chunk",
            Self::Embed => "embed",
            Self::Index => "index",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== FileType Tests ====================

    #[test]
    fn test_file_type_from_tag() {
        assert_eq!(FileType::from_tag("pdf"), Some(FileType::Pdf));
        assert_eq!(FileType::from_tag("DOCX"), Some(FileType::Docx));
        assert_eq!(FileType::from_tag("markdown"), Some(FileType::Md));
        assert_eq!(FileType::from_tag("exe"), None);
    }

    #[test]
    fn test_file_type_serialization() {
        assert_eq!(serde_json::to_string(&FileType::Pdf).unwrap(), "\"pdf\"");
        assert_eq!(serde_json::to_string(&FileType::Md).unwrap(), "\"md\"");
    }

    // ==================== Extraction Tests ====================

    #[test]
    fn test_extraction_full_text_joins_pages() {
        let extraction = Extraction {
            pages: vec![
                Page {
                    page_number: 1,
                    content: "first".to_string(),
                    metadata: HashMap::new(),
                },
                Page {
                    page_number: 2,
                    content: "second".to_string(),
                    metadata: HashMap::new(),
                },
            ],
            total_pages: 2,
            metadata: HashMap::new(),
        };

        assert_eq!(extraction.full_text(), "first\n\nsecond");
    }

    // ==================== Chunk Tests ====================

    #[test]
    fn test_chunk_payload_from_chunk() {
        let chunk = Chunk {
            content: "body".to_string(),
            chunk_index: 3,
            page_number: Some(2),
            token_count: 1,
            metadata: ChunkMetadata {
                document_id: "doc-1".to_string(),
                document_name: "report.pdf".to_string(),
                chunk_index: 3,
                page_number: Some(2),
                total_chunks: 7,
            },
        };

        let payload = ChunkPayload::from(&chunk);
        assert_eq!(payload.document_id, "doc-1");
        assert_eq!(payload.document_name, "report.pdf");
        assert_eq!(payload.chunk_index, 3);
        assert_eq!(payload.page_number, Some(2));
        assert_eq!(payload.content, "body");
    }

    // ==================== TokenUsage Tests ====================

    #[test]
    fn test_token_usage_reported_total() {
        let usage = TokenUsage::new(10, 5, Some(16));
        assert_eq!(usage.total, 16);
    }

    #[test]
    fn test_token_usage_computed_total() {
        let usage = TokenUsage::new(10, 5, None);
        assert_eq!(usage.total, 15);
    }

    #[test]
    fn test_token_usage_default_is_zero() {
        let usage = TokenUsage::default();
        assert_eq!(usage.prompt, 0);
        assert_eq!(usage.completion, 0);
        assert_eq!(usage.total, 0);
    }

    // ==================== RetrievedChunk Tests ====================

    #[test]
    fn test_retrieved_chunk_from_hit() {
        let hit = IndexHit {
            id: "p-1".to_string(),
            score: 0.92,
            payload: ChunkPayload {
                document_id: "doc-1".to_string(),
                document_name: "notes.txt".to_string(),
                chunk_index: 0,
                page_number: None,
                content: "chunk body".to_string(),
            },
        };

        let chunk = RetrievedChunk::from(hit);
        assert_eq!(chunk.document_id, "doc-1");
        assert_eq!(chunk.relevance_score, 0.92);
        assert_eq!(chunk.page_number, None);
    }

    // ==================== DocumentStatus Tests ====================

    #[test]
    fn test_status_happy_path_transitions() {
        assert!(DocumentStatus::Pending.can_transition(DocumentStatus::Processing));
        assert!(DocumentStatus::Processing.can_transition(DocumentStatus::Ready));
        assert!(DocumentStatus::Processing.can_transition(DocumentStatus::Failed));
    }

    #[test]
    fn test_status_failure_from_pending() {
        assert!(DocumentStatus::Pending.can_transition(DocumentStatus::Failed));
    }

    #[test]
    fn test_status_reprocessing_transitions() {
        assert!(DocumentStatus::Failed.can_transition(DocumentStatus::Processing));
        assert!(DocumentStatus::Ready.can_transition(DocumentStatus::Processing));
    }

    #[test]
    fn test_status_invalid_transitions() {
        assert!(!DocumentStatus::Pending.can_transition(DocumentStatus::Ready));
        assert!(!DocumentStatus::Ready.can_transition(DocumentStatus::Failed));
        assert!(!DocumentStatus::Failed.can_transition(DocumentStatus::Ready));
    }

    #[test]
    fn test_status_terminal() {
        assert!(DocumentStatus::Ready.is_terminal());
        assert!(DocumentStatus::Failed.is_terminal());
        assert!(!DocumentStatus::Pending.is_terminal());
        assert!(!DocumentStatus::Processing.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Ready).unwrap(),
            "\"ready\""
        );
    }

    // ==================== DocumentRecord Tests ====================

    #[test]
    fn test_new_record_is_pending() {
        let record = DocumentRecord::new(
            "report.pdf".to_string(),
            FileType::Pdf,
            4096,
            "abc123".to_string(),
        );

        assert_eq!(record.status, DocumentStatus::Pending);
        assert_eq!(record.chunk_count, 0);
        assert_eq!(record.page_count, 0);
        assert!(record.error_message.is_none());
    }

    // ==================== IngestStage Tests ====================

    #[test]
    fn test_ingest_stage_display() {
        assert_eq!(IngestStage::Extract.to_string(), "extract");
        assert_eq!(IngestStage::Chunk.to_string(), "chunk");
        assert_eq!(IngestStage::Embed.to_string(), "embed");
        assert_eq!(IngestStage::Index.to_string(), "index");
    }

    // ==================== ChatMessage Tests ====================

    #[test]
    fn test_chat_message_constructors() {
        let user = ChatMessage::user("hello");
        let assistant = ChatMessage::assistant("hi");
        assert_eq!(user.role, ChatRole::User);
        assert_eq!(assistant.role, ChatRole::Assistant);
    }

    #[test]
    fn test_chat_role_serialization() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&ChatRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
