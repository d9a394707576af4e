//! Candidate retrieval: plain similarity or maximal marginal relevance.
//!
//! Retrieval operates entirely through the [`VectorStore`] trait. The
//! caller embeds the query and passes the vector in; the output is the
//! ordered candidate sequence the re-ranker consumes.
//!
//! # MMR
//!
//! 1. Fetch `fetch_k` candidates by cosine similarity.
//! 2. Pick the most similar candidate first.
//! 3. Repeatedly pick the candidate maximising
//!    `λ·sim(query, d) − (1−λ)·max_{s ∈ selected} sim(d, s)`
//!    until `k` are selected or the pool is empty.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::embedding::cosine_similarity;
use crate::models::RetrievedChunk;
use crate::store::{Candidate, VectorStore};

/// How candidates are selected from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Similarity,
    #[default]
    Mmr,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Similarity => f.write_str("similarity"),
            Strategy::Mmr => f.write_str("mmr"),
        }
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "similarity" => Ok(Strategy::Similarity),
            "mmr" => Ok(Strategy::Mmr),
            other => anyhow::bail!("Unknown retrieval strategy: {}. Use mmr or similarity.", other),
        }
    }
}

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalParams {
    pub strategy: Strategy,
    /// Number of candidates returned.
    pub k: usize,
    /// Size of the similarity pool MMR selects from.
    pub fetch_k: usize,
    /// Relevance weight λ in `[0, 1]`; 1.0 degenerates to plain similarity.
    pub lambda_mult: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            strategy: Strategy::Mmr,
            k: 6,
            fetch_k: 15,
            lambda_mult: 0.7,
        }
    }
}

/// Retrieve candidates for `query_vec` from `store`.
pub async fn retrieve(
    store: &dyn VectorStore,
    query_vec: &[f32],
    params: &RetrievalParams,
) -> Result<Vec<RetrievedChunk>> {
    if params.k == 0 {
        return Ok(Vec::new());
    }

    let selected = match params.strategy {
        Strategy::Similarity => store.similarity_search(query_vec, params.k).await?,
        Strategy::Mmr => {
            let pool = store
                .similarity_search(query_vec, params.fetch_k.max(params.k))
                .await?;
            mmr_select(query_vec, pool, params.k, params.lambda_mult)
        }
    };

    Ok(selected.into_iter().map(Candidate::into_retrieved).collect())
}

/// Greedy maximal-marginal-relevance selection over `pool`.
///
/// Relevance is recomputed against `query_vec` from each candidate's stored
/// vector; the returned candidates keep their original `score`.
pub fn mmr_select(
    query_vec: &[f32],
    pool: Vec<Candidate>,
    k: usize,
    lambda_mult: f32,
) -> Vec<Candidate> {
    let relevance: Vec<f32> = pool
        .iter()
        .map(|c| cosine_similarity(query_vec, &c.vector))
        .collect();

    let mut remaining: Vec<usize> = (0..pool.len()).collect();
    let mut picked: Vec<usize> = Vec::with_capacity(k.min(pool.len()));

    while picked.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (pos, &idx) in remaining.iter().enumerate() {
            let redundancy = picked
                .iter()
                .map(|&s| cosine_similarity(&pool[idx].vector, &pool[s].vector))
                .fold(f32::NEG_INFINITY, f32::max);
            let redundancy = if picked.is_empty() { 0.0 } else { redundancy };
            let score = lambda_mult * relevance[idx] - (1.0 - lambda_mult) * redundancy;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }
        picked.push(remaining.remove(best_pos));
    }

    let mut slots: Vec<Option<Candidate>> = pool.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::build_chunk;
    use crate::models::{Category, Provenance};
    use crate::store::memory::InMemoryStore;

    fn candidate(name: &str, vector: Vec<f32>, query: &[f32]) -> Candidate {
        Candidate {
            chunk: build_chunk(name, Category::Content, &Provenance::new("m.pdf", 1), 0),
            score: cosine_similarity(query, &vector),
            vector,
        }
    }

    fn names(c: &[Candidate]) -> Vec<&str> {
        c.iter().map(|c| c.chunk.text.as_str()).collect()
    }

    #[test]
    fn test_mmr_first_pick_is_most_similar() {
        let q = [1.0, 0.0];
        let pool = vec![
            candidate("a", vec![0.9, 0.1], &q),
            candidate("b", vec![1.0, 0.0], &q),
        ];
        let out = mmr_select(&q, pool, 1, 0.7);
        assert_eq!(names(&out), vec!["b"]);
    }

    #[test]
    fn test_mmr_prefers_diverse_second_pick() {
        let q = [1.0, 0.0, 0.0];
        let pool = vec![
            candidate("best", vec![0.9, 0.3, 0.0], &q),
            candidate("duplicate", vec![0.9, 0.31, 0.0], &q),
            candidate("diverse", vec![0.8, -0.4, 0.0], &q),
        ];
        let out = mmr_select(&q, pool, 2, 0.5);
        assert_eq!(names(&out), vec!["best", "diverse"]);
    }

    #[test]
    fn test_mmr_lambda_one_is_similarity_order() {
        let q = [1.0, 0.0, 0.0];
        let pool = vec![
            candidate("best", vec![0.9, 0.3, 0.0], &q),
            candidate("duplicate", vec![0.9, 0.31, 0.0], &q),
            candidate("diverse", vec![0.8, -0.4, 0.0], &q),
        ];
        let out = mmr_select(&q, pool, 3, 1.0);
        assert_eq!(names(&out), vec!["best", "duplicate", "diverse"]);
    }

    #[test]
    fn test_mmr_small_pool() {
        let q = [1.0, 0.0];
        let pool = vec![candidate("only", vec![1.0, 0.0], &q)];
        assert_eq!(mmr_select(&q, pool, 6, 0.7).len(), 1);
        assert!(mmr_select(&q, Vec::new(), 6, 0.7).is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_similarity_strategy() {
        let store = InMemoryStore::new();
        let chunks: Vec<_> = (0..4)
            .map(|i| build_chunk(&format!("c{}", i), Category::Content, &Provenance::new("m.pdf", 1), i))
            .collect();
        let vectors = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 0.2],
        ];
        store.add_chunks(&chunks, &vectors).await.unwrap();

        let params = RetrievalParams {
            strategy: Strategy::Similarity,
            k: 2,
            ..RetrievalParams::default()
        };
        let out = retrieve(&store, &[1.0, 0.0], &params).await.unwrap();
        let texts: Vec<_> = out.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["c1", "c3"]);
    }

    #[tokio::test]
    async fn test_retrieve_mmr_returns_at_most_k() {
        let store = InMemoryStore::new();
        let chunks: Vec<_> = (0..10)
            .map(|i| build_chunk(&format!("c{}", i), Category::Content, &Provenance::new("m.pdf", 1), i))
            .collect();
        let vectors: Vec<_> = (0..10).map(|i| vec![1.0, i as f32 * 0.1]).collect();
        store.add_chunks(&chunks, &vectors).await.unwrap();

        let out = retrieve(&store, &[1.0, 0.0], &RetrievalParams::default())
            .await
            .unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].chunk.text, "c0");
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("mmr".parse::<Strategy>().unwrap(), Strategy::Mmr);
        assert_eq!("similarity".parse::<Strategy>().unwrap(), Strategy::Similarity);
        assert!("hybrid".parse::<Strategy>().is_err());
    }
}
