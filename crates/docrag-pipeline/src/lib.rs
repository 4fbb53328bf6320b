//! Ingestion and query orchestration for docrag.
//!
//! [`RagPipeline`] sequences the two flows that share one vector index:
//!
//! ```text
//! ingest: file → pages → chunks → vectors + payload → index
//! query:  question (+history, +filters) → query vector → ranked chunks
//!         → grounded prompt → answer + citations
//! ```
//!
//! [`DocumentManager`] sits above the pipeline and drives the document
//! lifecycle against the external persistence boundary: hash-based dedup at
//! upload, the `pending → processing → ready | failed` state machine, and
//! two-phase deletion of vectors and records.
//!
//! Pipelines hold no shared mutable state: each instance binds its own
//! splitter/embedder/retriever/generator to one index client, so
//! per-request instances are safe to run concurrently.

pub mod embedder;
pub mod generator;
pub mod hash;
pub mod manager;
pub mod pipeline;
pub mod prompts;
pub mod retriever;
pub mod state;

pub use embedder::DocumentEmbedder;
pub use generator::{AnswerGenerator, GenerationResult};
pub use hash::compute_file_hash;
pub use manager::DocumentManager;
pub use pipeline::{RagPipeline, FALLBACK_ANSWER};
pub use retriever::Retriever;
pub use state::{ConversationLog, MemoryDocumentStore, StoredMessage};
