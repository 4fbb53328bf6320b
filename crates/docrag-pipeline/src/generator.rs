//! Grounded answer generation.

use docrag_core::{ChatMessage, GenerateError, LlmConfig, LlmProvider, RetrievedChunk, TokenUsage};
use std::sync::Arc;
use tracing::debug;

use crate::prompts::{build_qa_prompt, SYSTEM_PROMPT};

/// Result of one generation call.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub answer: String,
    pub model_used: String,
    pub tokens_used: TokenUsage,
}

/// Builds a grounded prompt from ranked chunks and calls the LLM backend.
pub struct AnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Model name of the underlying backend.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Generate an answer grounded in the given chunks.
    ///
    /// Chunks are assembled in the order received; callers pass them ranked
    /// highest-relevance first.
    pub async fn generate(
        &self,
        question: &str,
        chunks: &[RetrievedChunk],
        chat_history: &[ChatMessage],
    ) -> Result<GenerationResult, GenerateError> {
        let prompt = build_qa_prompt(question, chunks, chat_history);
        debug!(
            chunks = chunks.len(),
            prompt_chars = prompt.len(),
            "generating answer"
        );

        let generation = self
            .provider
            .generate(SYSTEM_PROMPT, &prompt, self.temperature, self.max_tokens)
            .await?;

        Ok(GenerationResult {
            answer: generation.content,
            model_used: generation.model,
            tokens_used: generation.usage,
        })
    }
}
