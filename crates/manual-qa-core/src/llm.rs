//! Language-model completion boundary.
//!
//! The assistant only needs low-temperature text completion: a prompt goes
//! in, answer text comes out. Concrete clients live in the app crate.

use anyhow::Result;
use async_trait::async_trait;

/// A text-completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o"`).
    fn model_name(&self) -> &str;
    /// Complete `prompt` and return the generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
