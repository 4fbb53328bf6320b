//! OpenAI-compatible backends.
//!
//! `base_url` defaults to the OpenAI API but may point at any compatible
//! gateway; the wire format is identical.

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

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Generous: ingestion-path embedding requests may carry large batches.
const EMBED_TIMEOUT: Duration = Duration::from_secs(120);
/// Query-path completions should fail fast enough to surface to a user.
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Completion
// ============================================================================

/// OpenAI-compatible chat completion backend.
pub struct OpenAiLlm {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiLlm {
    pub fn new(config: &LlmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(CHAT_TIMEOUT)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
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
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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
    choices: Vec<ChatChoice>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    total_tokens: Option<u64>,
}

fn parse_chat_response(body: &str, fallback_model: &str) -> Result<Generation, GenerateError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::Response(e.to_string()))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerateError::Response("no choices in response".to_string()))?;

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens))
        .unwrap_or_default();

    Ok(Generation {
        content: choice.message.content,
        model: response.model.unwrap_or_else(|| fallback_model.to_string()),
        usage,
    })
}

// ============================================================================
// Embedding
// ============================================================================

/// OpenAI-compatible embedding backend.
pub struct OpenAiEmbedding {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedding {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: build_client(EMBED_TIMEOUT)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = texts.len(), model = %self.model, "embedding batch");
        let body = json!({
            "model": self.model,
            "input": texts,
            "dimensions": self.dimension,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(EmbedError::Request(format!("{status}: {text}")));
        }

        parse_embedding_response(&text, texts.len())
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

fn parse_embedding_response(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, EmbedError> {
    let mut response: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| EmbedError::Response(e.to_string()))?;

    if response.data.len() != expected {
        return Err(EmbedError::Response(format!(
            "expected {expected} embeddings, got {}",
            response.data.len()
        )));
    }

    // Input order is the contract; the index field is authoritative.
    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}
