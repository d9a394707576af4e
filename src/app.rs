//! Wires configuration into a ready [`Assistant`].

use anyhow::Result;
use std::sync::Arc;

use manual_qa_core::assistant::Assistant;
use manual_qa_core::memory::InMemorySessionStore;
use manual_qa_core::segment::Segmenter;

use crate::config::Config;
use crate::db;
use crate::embedding::create_provider;
use crate::llm::create_model;
use crate::migrate::create_schema;
use crate::sqlite_store::SqliteStore;

/// Connect to the database (creating the schema if needed) and build the
/// assistant with the configured providers.
pub async fn open_assistant(config: &Config) -> Result<Assistant> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;

    let embedder = create_provider(&config.embedding)?;
    let llm = create_model(&config.llm)?;
    let store = SqliteStore::new(pool, embedder.model_name());

    Ok(Assistant::new(
        Segmenter::new(config.chunking.segmenter_config()),
        embedder,
        Arc::new(store),
        llm,
        Arc::new(InMemorySessionStore::new(config.memory.max_turns)),
        config.assistant_params()?,
    ))
}
