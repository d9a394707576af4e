//! Intent-aware re-ranking of retrieved chunks.
//!
//! Candidates are visited in their incoming similarity order and placed into
//! the output list:
//!
//! | Condition | Placement |
//! |-----------|-----------|
//! | safety question and `safety` chunk | front |
//! | procedure question and category containing `procedure` | front |
//! | `high` priority chunk | slot 1 (or append if the list is empty) |
//! | anything else | append |
//!
//! The list is then truncated to the context budget (4 by default).
//!
//! Front placement is governed by a [`TieBreak`] policy. The default,
//! [`TieBreak::MostRecentFirst`], inserts at index 0 on every match, so among
//! several promoted chunks the one seen *last* ends up first.

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::models::{Category, Priority, RetrievedChunk};

/// Default number of chunks handed to the answer composer.
pub const DEFAULT_CONTEXT_LIMIT: usize = 4;

/// How promoted chunks are ordered relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Insert every promoted chunk at index 0; high-priority chunks at
    /// index `min(1, len)`.
    #[default]
    MostRecentFirst,
    /// Promoted chunks first, then high-priority chunks, then the rest,
    /// each group in similarity order.
    SimilarityOrder,
}

/// Re-ranker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reranker {
    pub limit: usize,
    pub tie_break: TieBreak,
}

impl Default for Reranker {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONTEXT_LIMIT,
            tie_break: TieBreak::default(),
        }
    }
}

impl Reranker {
    pub fn new(limit: usize, tie_break: TieBreak) -> Self {
        Self { limit, tie_break }
    }

    /// Reorder and truncate `candidates` for `intent`.
    pub fn rerank(&self, candidates: Vec<RetrievedChunk>, intent: Intent) -> Vec<RetrievedChunk> {
        let mut out: Vec<RetrievedChunk> = Vec::with_capacity(candidates.len());
        let mut promoted = 0usize;
        let mut high = 0usize;

        for candidate in candidates {
            let slot = if matches_intent(intent, candidate.chunk.category) {
                let at = match self.tie_break {
                    TieBreak::MostRecentFirst => 0,
                    TieBreak::SimilarityOrder => promoted,
                };
                promoted += 1;
                at
            } else if candidate.chunk.priority == Priority::High {
                let at = match self.tie_break {
                    TieBreak::MostRecentFirst => 1.min(out.len()),
                    TieBreak::SimilarityOrder => promoted + high,
                };
                high += 1;
                at
            } else {
                out.len()
            };
            out.insert(slot, candidate);
        }

        out.truncate(self.limit);
        out
    }
}

/// Re-rank with the default budget and tie-break.
pub fn rerank(candidates: Vec<RetrievedChunk>, intent: Intent) -> Vec<RetrievedChunk> {
    Reranker::default().rerank(candidates, intent)
}

fn matches_intent(intent: Intent, category: Category) -> bool {
    match intent {
        Intent::Safety => category == Category::Safety,
        Intent::Procedure => category.as_str().contains("procedure"),
        _ => false,
    }
}
