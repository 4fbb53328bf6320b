//! Ollama backends for local models.

use async_trait::async_trait;
use docrag_core::{
    ConfigError, EmbedError, EmbeddingConfig, EmbeddingProvider, GenerateError, Generation,
    LlmConfig, LlmProvider, TokenUsage,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::build_client;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Local models can be slow; both paths get a generous budget.
const CHAT_TIMEOUT: Duration = Duration::from_secs(120);
const EMBED_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Completion
// ============================================================================

/// Ollama chat completion backend.
pub struct OllamaLlm {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaLlm {
    pub fn new(config: &LlmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(CHAT_TIMEOUT)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Generation, GenerateError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
            "stream": false,
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerateError::Request(format!("{status}: {text}")));
        }

        parse_chat_response(&text, &self.model)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
    model: Option<String>,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

fn parse_chat_response(body: &str, fallback_model: &str) -> Result<Generation, GenerateError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::Response(e.to_string()))?;

    // Ollama reports eval counts only; the total is computed.
    let usage = TokenUsage::new(
        response.prompt_eval_count.unwrap_or(0),
        response.eval_count.unwrap_or(0),
        None,
    );

    Ok(Generation {
        content: response.message.content,
        model: response.model.unwrap_or_else(|| fallback_model.to_string()),
        usage,
    })
}

// ============================================================================
// Embedding
// ============================================================================

/// Ollama embedding backend.
///
/// The embeddings endpoint takes one prompt per request, so a batch becomes
/// a sequential series of calls in input order.
pub struct OllamaEmbedding {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedding {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(EMBED_TIMEOUT)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut vectors = Vec::with_capacity(texts.len());

        for text in texts {
            debug!(model = %self.model, "embedding text");
            let body = json!({
                "model": self.model,
                "prompt": text,
            });

            let response = self
                .client
                .post(format!("{}/api/embeddings", self.base_url))
                .json(&body)
                .send()
                .await
                .map_err(|e| EmbedError::Request(e.to_string()))?;

            let status = response.status();
            let payload = response
                .text()
                .await
                .map_err(|e| EmbedError::Request(e.to_string()))?;
            if !status.is_success() {
                return Err(EmbedError::Request(format!("{status}: {payload}")));
            }

            vectors.push(parse_embedding_response(&payload)?);
        }

        Ok(vectors)
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

fn parse_embedding_response(body: &str) -> Result<Vec<f32>, EmbedError> {
    let response: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| EmbedError::Response(e.to_string()))?;
    Ok(response.embedding)
}
