//! LLM and embedding backends for docrag.
//!
//! Each backend implements the [`LlmProvider`]/[`EmbeddingProvider`]
//! contracts from `docrag-core` over plain HTTP:
//!
//! | Backend | Completion | Embedding |
//! |---------|------------|-----------|
//! | [`OpenAiLlm`] / [`OpenAiEmbedding`] | `/chat/completions` | `/embeddings` |
//! | [`AnthropicLlm`] | `/v1/messages` | — |
//! | [`OllamaLlm`] / [`OllamaEmbedding`] | `/api/chat` | `/api/embeddings` |
//!
//! Selection is a pure factory over the configuration enums; there is no
//! runtime type sniffing. Heterogeneous usage accounting is normalized into
//! [`docrag_core::TokenUsage`], computing the total when a provider does not
//! report one. Calls are not retried internally: failures surface to the
//! caller, which decides whether the ingestion or query attempt fails.

pub mod anthropic;
pub mod ollama;
pub mod openai;

pub use anthropic::AnthropicLlm;
pub use ollama::{OllamaEmbedding, OllamaLlm};
pub use openai::{OpenAiEmbedding, OpenAiLlm};

use docrag_core::{
    ConfigError, EmbeddingConfig, EmbeddingProvider, EmbeddingProviderKind, LlmConfig,
    LlmProvider, LlmProviderKind,
};
use std::sync::Arc;

/// Build the configured LLM backend.
pub fn llm_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ConfigError> {
    match config.provider {
        LlmProviderKind::OpenAi => Ok(Arc::new(OpenAiLlm::new(config)?)),
        LlmProviderKind::Anthropic => Ok(Arc::new(AnthropicLlm::new(config)?)),
        LlmProviderKind::Ollama => Ok(Arc::new(OllamaLlm::new(config)?)),
    }
}

/// Build the configured embedding backend.
pub fn embedding_provider(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, ConfigError> {
    match config.provider {
        EmbeddingProviderKind::OpenAi => Ok(Arc::new(OpenAiEmbedding::new(config)?)),
        EmbeddingProviderKind::Ollama => Ok(Arc::new(OllamaEmbedding::new(config)?)),
    }
}

pub(crate) fn build_client(timeout: std::time::Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("failed to build http client: {e}")))
}
