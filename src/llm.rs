//! Language-model clients.
//!
//! [`OpenAIChat`] calls `POST /v1/chat/completions` with a single user
//! message carrying the composed prompt. [`DisabledModel`] fails every call.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use manual_qa_core::llm::LanguageModel;

use crate::config::LlmConfig;
use crate::openai;

pub struct DisabledModel;

#[async_trait]
impl LanguageModel for DisabledModel {
    fn model_name(&self) -> &str {
        "disabled"
    }
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("Language model provider is disabled")
    }
}

/// OpenAI chat completion client.
pub struct OpenAIChat {
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenAIChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("llm.model required for OpenAI provider"))?;

        openai::api_key()?;

        Ok(Self {
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            client: openai::client(config.timeout_secs)?,
        })
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAIChat {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = self.request_body(prompt);
        let json =
            openai::post_json(&self.client, "chat/completions", &body, self.max_retries).await?;
        parse_chat_response(&json)
    }
}

/// Extract `choices[0].message.content`.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

pub fn create_model(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledModel)),
        "openai" => Ok(Arc::new(OpenAIChat::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}
