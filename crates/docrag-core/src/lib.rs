//! # docrag-core
//!
//! Core types and traits for docrag, a retrieval-augmented document Q&A
//! pipeline.
//!
//! This crate provides the foundational abstractions used throughout docrag:
//!
//! - **Content Extraction**: [`Extractor`] trait for turning files into pages
//! - **Embedding Generation**: [`EmbeddingProvider`] trait for text-to-vector
//!   services
//! - **Answer Generation**: [`LlmProvider`] trait for grounded LLM completion
//! - **Vector Indexing**: [`VectorIndex`] trait for similarity search over
//!   chunk vectors
//! - **Document Persistence**: [`DocumentStore`] trait for the external
//!   document/chunk record boundary
//!
//! ## Architecture
//!
//! The crate is organized around two pipelines sharing one index:
//!
//! ```text
//! File → Extractor → TokenSplitter → EmbeddingProvider → VectorIndex
//!                                                            ↓
//!                     Question → Retriever → Generator → QueryOutcome
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Page`] | One logical page of extracted text |
//! | [`Chunk`] | A token-bounded segment of a document |
//! | [`RetrievedChunk`] | A search hit mapped back to its document |
//! | [`DocumentRecord`] | Lifecycle state of an uploaded document |
//! | [`QueryOutcome`] | Answer, citations, and token accounting |
//!
//! ## Related Crates
//!
//! - `docrag-extract`: per-format extraction implementations
//! - `docrag-chunker`: token-aware splitting
//! - `docrag-providers`: OpenAI/Anthropic/Ollama backends
//! - `docrag-index`: Qdrant client and in-memory index
//! - `docrag-pipeline`: ingestion/query orchestration

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{
    EmbeddingConfig, EmbeddingProviderKind, IndexConfig, LlmConfig, LlmProviderKind, RagConfig,
    Settings,
};
pub use error::{
    ChunkError, ConfigError, EmbedError, Error, ExtractError, GenerateError, IndexError,
    IngestError, Result, StoreError,
};
pub use traits::*;
pub use types::*;
