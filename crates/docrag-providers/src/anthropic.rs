//! Anthropic Messages API backend.

use async_trait::async_trait;
use docrag_core::{
    ConfigError, GenerateError, Generation, LlmConfig, LlmProvider, TokenUsage,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::build_client;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// Anthropic chat completion backend.
pub struct AnthropicLlm {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicLlm {
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
impl LlmProvider for AnthropicLlm {
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
            "max_tokens": max_tokens,
            "temperature": temperature,
            "system": system_prompt,
            "messages": [
                {"role": "user", "content": user_prompt},
            ],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
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

        parse_messages_response(&text, &self.model)
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    model: Option<String>,
    usage: Option<MessagesUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

fn parse_messages_response(body: &str, fallback_model: &str) -> Result<Generation, GenerateError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::Response(e.to_string()))?;

    let content = response
        .content
        .into_iter()
        .map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");
    if content.is_empty() {
        return Err(GenerateError::Response(
            "no text content in response".to_string(),
        ));
    }

    // Anthropic reports input/output only; the total is computed.
    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens, None))
        .unwrap_or_default();

    Ok(Generation {
        content,
        model: response.model.unwrap_or_else(|| fallback_model.to_string()),
        usage,
    })
}
