//! Error types for docrag.

use thiserror::Error;
use uuid::Uuid;

use crate::types::{DocumentStatus, IngestStage};

/// Main error type for docrag operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Content extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Chunking failed
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkError),

    /// Embedding service call failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// LLM service call failed
    #[error("generation error: {0}")]
    Generation(#[from] GenerateError),

    /// Vector index operation failed
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Document store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Ingestion failed at a named stage
    #[error(transparent)]
    Ingestion(#[from] IngestError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Configuration errors. Fatal and never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("unknown LLM provider: {0}")]
    UnknownLlmProvider(String),

    #[error("unknown embedding provider: {0}")]
    UnknownEmbeddingProvider(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Content extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The source container cannot be parsed at all
    #[error("unreadable source: {0}")]
    Unreadable(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunking errors.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tokenizer initialization failed: {0}")]
    Tokenizer(String),
}

/// Embedding service errors. Surfaced without internal retry; the caller
/// decides whether the ingestion or query attempt fails.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("unexpected embedding response: {0}")]
    Response(String),
}

/// LLM service errors.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("unexpected generation response: {0}")]
    Response(String),
}

/// Vector index errors.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("vector index unavailable: {0}")]
    Unavailable(String),

    #[error("index request failed: {0}")]
    Request(String),

    #[error("unexpected index response: {0}")]
    Response(String),
}

/// Document store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(Uuid),

    /// Upload conflict: a document with the same file hash already exists.
    #[error("duplicate document: content already stored as \"{name}\" ({id})")]
    Duplicate { id: Uuid, name: String },

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Ingestion failure carrying the stage that failed.
///
/// The pipeline wraps stage errors without catching them, so the caller can
/// persist `Failed` with a human-readable message.
#[derive(Error, Debug)]
#[error("ingestion failed at {stage}: {source}")]
pub struct IngestError {
    /// Stage that failed
    pub stage: IngestStage,
    /// Underlying error
    #[source]
    pub source: Box<Error>,
}

impl IngestError {
    pub fn new(stage: IngestStage, source: impl Into<Error>) -> Self {
        Self {
            stage,
            source: Box::new(source.into()),
        }
    }
}

/// Result type alias for docrag operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnsupportedFileType("xlsx".to_string());
        assert_eq!(err.to_string(), "unsupported file type: xlsx");
    }

    #[test]
    fn test_extract_error_unreadable_display() {
        let err = ExtractError::Unreadable("corrupt pdf header".to_string());
        assert_eq!(err.to_string(), "unreadable source: corrupt pdf header");
    }

    #[test]
    fn test_extract_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExtractError = io_err.into();
        assert!(matches!(err, ExtractError::Io(_)));
    }

    #[test]
    fn test_chunk_error_display() {
        let err = ChunkError::InvalidConfig("overlap must be smaller than size".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: overlap must be smaller than size"
        );
    }

    #[test]
    fn test_embed_error_display() {
        let err = EmbedError::Request("connection refused".to_string());
        assert_eq!(err.to_string(), "embedding request failed: connection refused");
    }

    #[test]
    fn test_index_error_display() {
        let err = IndexError::Unavailable("http://localhost:6333 unreachable".to_string());
        assert!(err.to_string().contains("vector index unavailable"));
    }

    #[test]
    fn test_store_error_duplicate_display() {
        let id = Uuid::new_v4();
        let err = StoreError::Duplicate {
            id,
            name: "report.pdf".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("report.pdf"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_store_error_invalid_transition_display() {
        let err = StoreError::InvalidTransition {
            from: DocumentStatus::Ready,
            to: DocumentStatus::Failed,
        };
        assert_eq!(err.to_string(), "invalid status transition: ready -> failed");
    }

    #[test]
    fn test_ingest_error_carries_stage() {
        let err = IngestError::new(
            IngestStage::Embed,
            EmbedError::Request("timeout".to_string()),
        );
        assert_eq!(err.stage, IngestStage::Embed);
        assert!(err.to_string().contains("ingestion failed at embed"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_error_chain_embed_to_main() {
        let embed_err = EmbedError::Response("missing data field".to_string());
        let err: Error = embed_err.into();
        assert!(matches!(err, Error::Embedding(_)));
        assert!(err.to_string().contains("missing data field"));
    }

    #[test]
    fn test_error_from_ingest_error_is_transparent() {
        let err: Error = IngestError::new(
            IngestStage::Extract,
            ExtractError::Unreadable("bad container".to_string()),
        )
        .into();
        assert_eq!(
            err.to_string(),
            "ingestion failed at extract: extraction error: unreadable source: bad container"
        );
    }

    #[test]
    fn test_result_type_alias() {
        fn ok() -> Result<u32> {
            Ok(1)
        }
        fn fails() -> Result<u32> {
            Err(Error::Other("boom".to_string()))
        }

        assert!(ok().is_ok());
        assert!(fails().is_err());
    }
}
