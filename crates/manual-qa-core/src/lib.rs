//! # Manual QA Core
//!
//! Runtime-free logic for answering questions over technical manuals:
//! domain-aware segmentation of manual text into safety, procedure and
//! residual passages, question intent classification, intent-aware
//! re-ranking of retrieved passages, prompt composition, and bounded
//! per-session conversation memory.
//!
//! External collaborators (embedding service, vector index, language
//! model) are reached only through the [`embedding::EmbeddingProvider`],
//! [`store::VectorStore`] and [`llm::LanguageModel`] traits. This crate
//! contains no tokio, sqlx, HTTP, or filesystem I/O.

pub mod assistant;
pub mod classify;
pub mod compose;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod intent;
pub mod llm;
pub mod memory;
pub mod metadata;
pub mod models;
pub mod rerank;
pub mod search;
pub mod segment;
pub mod split;
pub mod store;
