//! In-memory [`VectorStore`] implementation for tests and dry runs.
//!
//! Rows live in a `Vec` behind `std::sync::RwLock`. Vector search is
//! brute-force cosine similarity over all stored vectors.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::Chunk;

use super::{Candidate, VectorStore};

struct StoredChunk {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-memory vector index.
pub struct InMemoryStore {
    rows: RwLock<Vec<StoredChunk>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    /// Every stored chunk, in insertion order.
    pub fn chunks(&self) -> Vec<Chunk> {
        match self.rows.read() {
            Ok(rows) => rows.iter().map(|r| r.chunk.clone()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add_chunks(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != vectors.len() {
            bail!(
                "chunk/vector count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            );
        }
        let mut rows = self.rows.write().map_err(|_| anyhow!("store lock poisoned"))?;
        rows.extend(chunks.iter().zip(vectors).map(|(c, v)| StoredChunk {
            chunk: c.clone(),
            vector: v.clone(),
        }));
        Ok(())
    }

    async fn similarity_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<Candidate>> {
        let rows = self.rows.read().map_err(|_| anyhow!("store lock poisoned"))?;
        let mut candidates: Vec<Candidate> = rows
            .iter()
            .map(|r| Candidate {
                chunk: r.chunk.clone(),
                score: cosine_similarity(query_vec, &r.vector),
                vector: r.vector.clone(),
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn count(&self) -> Result<u64> {
        let rows = self.rows.read().map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(rows.len() as u64)
    }

    async fn count_by_category(&self) -> Result<Vec<(String, u64)>> {
        let rows = self.rows.read().map_err(|_| anyhow!("store lock poisoned"))?;
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for r in rows.iter() {
            *counts.entry(r.chunk.category.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::build_chunk;
    use crate::models::{Category, Provenance};

    fn chunk(text: &str, category: Category) -> Chunk {
        build_chunk(text, category, &Provenance::new("m.pdf", 1), 0)
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryStore::new();
        store
            .add_chunks(
                &[
                    chunk("far", Category::Content),
                    chunk("near", Category::Content),
                ],
                &[vec![0.0, 1.0], vec![1.0, 0.1]],
            )
            .await
            .unwrap();

        let hits = store.similarity_search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.text, "near");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = InMemoryStore::new();
        let chunks: Vec<_> = (0..5)
            .map(|i| chunk(&format!("c{}", i), Category::Content))
            .collect();
        let vectors: Vec<_> = (0..5).map(|i| vec![1.0, i as f32]).collect();
        store.add_chunks(&chunks, &vectors).await.unwrap();
        assert_eq!(store.similarity_search(&[1.0, 0.0], 3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mismatched_vectors_write_nothing() {
        let store = InMemoryStore::new();
        let result = store
            .add_chunks(&[chunk("a", Category::Content)], &[])
            .await;
        assert!(result.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_by_category() {
        let store = InMemoryStore::new();
        store
            .add_chunks(
                &[
                    chunk("a", Category::Safety),
                    chunk("b", Category::Content),
                    chunk("c", Category::Safety),
                ],
                &[vec![1.0], vec![1.0], vec![1.0]],
            )
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(
            store.count_by_category().await.unwrap(),
            vec![("content".to_string(), 1), ("safety".to_string(), 2)]
        );
    }
}
