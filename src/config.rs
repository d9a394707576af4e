//! Configuration parsing and validation.
//!
//! Manual QA reads a single TOML file (default `./config/mqa.toml`). Only
//! `[db]` is required; every other section falls back to the defaults the
//! pipeline was tuned with.
//!
//! ```toml
//! [db]
//! path = "./data/manuals.sqlite"
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//! dims = 1536
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use manual_qa_core::assistant::AssistantParams;
use manual_qa_core::rerank::{Reranker, TieBreak};
use manual_qa_core::search::{RetrievalParams, Strategy};
use manual_qa_core::segment::SegmenterConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_min_safety_chars")]
    pub min_safety_chars: usize,
    #[serde(default = "default_min_step_chars")]
    pub min_step_chars: usize,
    #[serde(default = "default_min_passage_chars")]
    pub min_passage_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_safety_chars: default_min_safety_chars(),
            min_step_chars: default_min_step_chars(),
            min_passage_chars: default_min_passage_chars(),
        }
    }
}

fn default_chunk_size() -> usize {
    650
}
fn default_chunk_overlap() -> usize {
    130
}
fn default_min_safety_chars() -> usize {
    50
}
fn default_min_step_chars() -> usize {
    60
}
fn default_min_passage_chars() -> usize {
    80
}

impl ChunkingConfig {
    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            min_safety_chars: self.min_safety_chars,
            min_step_chars: self.min_step_chars,
            min_passage_chars: self.min_passage_chars,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,
    #[serde(default = "default_lambda_mult")]
    pub lambda_mult: f32,
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            k: default_k(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda_mult(),
            context_limit: default_context_limit(),
            max_sources: default_max_sources(),
            tie_break: TieBreak::default(),
        }
    }
}

fn default_strategy() -> String {
    "mmr".to_string()
}
fn default_k() -> usize {
    6
}
fn default_fetch_k() -> usize {
    15
}
fn default_lambda_mult() -> f32 {
    0.7
}
fn default_context_limit() -> usize {
    4
}
fn default_max_sources() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_embedding_retries() -> u32 {
    5
}
fn default_embedding_timeout() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_retries")]
    pub max_retries: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_llm_retries(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_llm_retries() -> u32 {
    3
}
fn default_llm_timeout() -> u64 {
    60
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MemoryConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_rewrite_turns")]
    pub rewrite_turns: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            rewrite_turns: default_rewrite_turns(),
        }
    }
}

fn default_max_turns() -> usize {
    10
}
fn default_rewrite_turns() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Config {
    /// Assistant tuning derived from `[retrieval]`, `[memory]` and
    /// `[embedding]`.
    pub fn assistant_params(&self) -> Result<AssistantParams> {
        let strategy: Strategy = self.retrieval.strategy.parse()?;
        Ok(AssistantParams {
            retrieval: RetrievalParams {
                strategy,
                k: self.retrieval.k,
                fetch_k: self.retrieval.fetch_k,
                lambda_mult: self.retrieval.lambda_mult,
            },
            reranker: Reranker::new(self.retrieval.context_limit, self.retrieval.tie_break),
            max_sources: self.retrieval.max_sources,
            rewrite_turns: self.memory.rewrite_turns,
            batch_size: self.embedding.batch_size,
        })
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Chunking
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.chunk_overlap must be < chunking.chunk_size");
    }

    // Retrieval
    config.retrieval.strategy.parse::<Strategy>()?;
    if config.retrieval.k < 1 {
        anyhow::bail!("retrieval.k must be >= 1");
    }
    if config.retrieval.fetch_k < config.retrieval.k {
        anyhow::bail!("retrieval.fetch_k must be >= retrieval.k");
    }
    if !(0.0..=1.0).contains(&config.retrieval.lambda_mult) {
        anyhow::bail!("retrieval.lambda_mult must be in [0.0, 1.0]");
    }
    if config.retrieval.context_limit < 1 {
        anyhow::bail!("retrieval.context_limit must be >= 1");
    }

    // Memory
    if config.memory.max_turns < 1 {
        anyhow::bail!("memory.max_turns must be >= 1");
    }

    // Embedding
    match config.embedding.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    // LLM
    match config.llm.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be disabled or openai.",
            other
        ),
    }
    if config.llm.is_enabled() && config.llm.model.is_none() {
        anyhow::bail!(
            "llm.model must be specified when provider is '{}'",
            config.llm.provider
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse("[db]\npath = \"./data/m.sqlite\"\n").unwrap();
        assert_eq!(config.chunking.chunk_size, 650);
        assert_eq!(config.chunking.chunk_overlap, 130);
        assert_eq!(config.retrieval.k, 6);
        assert_eq!(config.retrieval.fetch_k, 15);
        assert_eq!(config.retrieval.context_limit, 4);
        assert_eq!(config.retrieval.tie_break, TieBreak::MostRecentFirst);
        assert_eq!(config.memory.max_turns, 10);
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert!(!config.embedding.is_enabled());
        assert!(!config.llm.is_enabled());

        let params = config.assistant_params().unwrap();
        assert_eq!(params.retrieval.strategy, Strategy::Mmr);
        assert_eq!(params.max_sources, 3);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let err = parse("[db]\npath = \"x\"\n[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")
            .unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_fetch_k_must_cover_k() {
        assert!(parse("[db]\npath = \"x\"\n[retrieval]\nk = 10\nfetch_k = 5\n").is_err());
    }

    #[test]
    fn test_lambda_range() {
        assert!(parse("[db]\npath = \"x\"\n[retrieval]\nlambda_mult = 1.5\n").is_err());
    }

    #[test]
    fn test_unknown_strategy() {
        assert!(parse("[db]\npath = \"x\"\n[retrieval]\nstrategy = \"hybrid\"\n").is_err());
    }

    #[test]
    fn test_tie_break_parse() {
        let config =
            parse("[db]\npath = \"x\"\n[retrieval]\ntie_break = \"similarity_order\"\n").unwrap();
        assert_eq!(config.retrieval.tie_break, TieBreak::SimilarityOrder);
    }

    #[test]
    fn test_enabled_embedding_requires_model_and_dims() {
        assert!(parse("[db]\npath = \"x\"\n[embedding]\nprovider = \"openai\"\n").is_err());
        assert!(parse(
            "[db]\npath = \"x\"\n[embedding]\nprovider = \"openai\"\nmodel = \"m\"\ndims = 8\n"
        )
        .is_ok());
    }

    #[test]
    fn test_enabled_llm_requires_model() {
        assert!(parse("[db]\npath = \"x\"\n[llm]\nprovider = \"openai\"\n").is_err());
        assert!(parse("[db]\npath = \"x\"\n[llm]\nprovider = \"anthropic\"\nmodel = \"m\"\n").is_err());
    }

    #[test]
    fn test_zero_max_turns_rejected() {
        assert!(parse("[db]\npath = \"x\"\n[memory]\nmax_turns = 0\n").is_err());
    }
}
