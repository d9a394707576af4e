//! Vector index abstraction.
//!
//! The [`VectorStore`] trait is everything the ingestion and retrieval
//! pipelines need from the external index: an all-or-nothing bulk insert,
//! a similarity search that returns stored vectors alongside the chunks
//! (so MMR can compare candidates with each other), and a few counts for
//! `stats`.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, RetrievedChunk};

/// A search hit with its stored embedding.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub chunk: Chunk,
    /// Cosine similarity to the query vector.
    pub score: f32,
    pub vector: Vec<f32>,
}

impl Candidate {
    pub fn into_retrieved(self) -> RetrievedChunk {
        RetrievedChunk {
            chunk: self.chunk,
            score: self.score,
        }
    }
}

/// Abstract vector index.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add_chunks`](VectorStore::add_chunks) | Persist chunks and their vectors atomically |
/// | [`similarity_search`](VectorStore::similarity_search) | Top-`limit` chunks by cosine similarity |
/// | [`count`](VectorStore::count) | Number of stored chunks |
/// | [`count_by_category`](VectorStore::count_by_category) | Stored chunks per category name |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store `chunks[i]` with `vectors[i]`. Either every chunk is written or
    /// none is.
    async fn add_chunks(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()>;

    /// Return at most `limit` candidates ordered by descending similarity.
    async fn similarity_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<Candidate>>;

    async fn count(&self) -> Result<u64>;

    /// `(category, count)` pairs sorted by category name.
    async fn count_by_category(&self) -> Result<Vec<(String, u64)>>;
}
