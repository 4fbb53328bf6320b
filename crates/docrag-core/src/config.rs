//! Configuration snapshot for docrag.
//!
//! Components receive the parts of [`Settings`] they need at construction
//! time; there is no process-wide mutable configuration. Live updates are
//! modeled by loading a new snapshot with a bumped `version` and building
//! fresh components from it — requests in flight keep the snapshot they were
//! constructed with.

use serde::{Deserialize, Serialize};

/// Versioned configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Snapshot version; bumped each time configuration is reloaded
    #[serde(default)]
    pub version: u64,

    /// Retrieval and chunking parameters
    #[serde(default)]
    pub rag: RagConfig,

    /// LLM backend selection
    #[serde(default)]
    pub llm: LlmConfig,

    /// Embedding backend selection
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index location
    #[serde(default)]
    pub index: IndexConfig,
}

/// Chunking and retrieval parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Maximum tokens per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Tokens shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Default number of chunks to retrieve
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Default minimum similarity score
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    5
}

fn default_score_threshold() -> f32 {
    0.7
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
        }
    }
}

/// LLM backend kinds selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
}

/// LLM backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which backend to use
    #[serde(default = "default_llm_provider")]
    pub provider: LlmProviderKind,

    /// Model name passed to the backend
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key, if the backend requires one
    #[serde(default)]
    pub api_key: String,

    /// Base URL override (OpenAI-compatible gateways, Ollama host)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_provider() -> LlmProviderKind {
    LlmProviderKind::OpenAi
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            api_key: String::new(),
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Embedding backend kinds selectable by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    OpenAi,
    Ollama,
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Which backend to use
    #[serde(default = "default_embedding_provider")]
    pub provider: EmbeddingProviderKind,

    /// Model name passed to the backend
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API key, if the backend requires one
    #[serde(default)]
    pub api_key: String,

    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,

    /// Vector dimension; must match the index collection
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Texts per request to the embedding service
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_embedding_provider() -> EmbeddingProviderKind {
    EmbeddingProviderKind::OpenAi
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_key: String::new(),
            base_url: None,
            dimension: default_dimension(),
            batch_size: default_batch_size(),
        }
    }
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Qdrant base URL
    #[serde(default = "default_index_url")]
    pub url: String,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_index_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "docrag_chunks".to_string()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            collection: default_collection(),
        }
    }
}
