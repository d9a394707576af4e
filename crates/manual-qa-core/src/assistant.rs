//! The question-answering assistant.
//!
//! [`Assistant`] wires the pure pipeline stages to the three external
//! collaborators (embedding, vector index, language model) and to the
//! conversation memory. It is cheap to clone; all collaborators are shared
//! behind `Arc`.
//!
//! # Answering a question
//!
//! 1. Load the session history and classify the question (or take the
//!    caller's intent override).
//! 2. If the session has history, ask the model to rewrite the question
//!    into a standalone search query.
//! 3. Embed the query, retrieve candidates, re-rank them by intent.
//! 4. Compose the context and prompt, and complete it.
//! 5. Cite up to `max_sources` unique pages and record the turn.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::compose::{build_context, build_prompt, build_rewrite_prompt, collect_sources};
use crate::embedding::{embed_query, EmbeddingProvider};
use crate::error::{QaError, QaResult, Stage};
use crate::ingest::{ingest_document, IngestObserver, IngestReport};
use crate::intent::{classify_question, Intent};
use crate::llm::LanguageModel;
use crate::memory::{SessionInfo, SessionStore};
use crate::models::Document;
use crate::rerank::Reranker;
use crate::search::{retrieve, RetrievalParams};
use crate::segment::Segmenter;
use crate::store::VectorStore;

/// Tuning knobs for the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantParams {
    pub retrieval: RetrievalParams,
    pub reranker: Reranker,
    /// Maximum number of citations per answer.
    pub max_sources: usize,
    /// Turns shown to the model when rewriting a follow-up question.
    pub rewrite_turns: usize,
    /// Texts per embedding request during ingestion.
    pub batch_size: usize,
}

impl Default for AssistantParams {
    fn default() -> Self {
        Self {
            retrieval: RetrievalParams::default(),
            reranker: Reranker::default(),
            max_sources: 3,
            rewrite_turns: 2,
            batch_size: 64,
        }
    }
}

/// A grounded answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Unique `"source (page N)"` labels in context order.
    pub sources: Vec<String>,
    pub intent: Intent,
    /// The query actually sent to retrieval (after rewriting).
    pub search_query: String,
    /// Number of chunks placed in the context.
    pub context_used: usize,
}

/// Index and memory totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantStats {
    pub active_sessions: usize,
    pub total_messages: usize,
    pub documents_in_db: u64,
    pub chunks_by_category: BTreeMap<String, u64>,
}

#[derive(Clone)]
pub struct Assistant {
    segmenter: Segmenter,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LanguageModel>,
    memory: Arc<dyn SessionStore>,
    params: AssistantParams,
}

impl Assistant {
    pub fn new(
        segmenter: Segmenter,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LanguageModel>,
        memory: Arc<dyn SessionStore>,
        params: AssistantParams,
    ) -> Self {
        Self {
            segmenter,
            embedder,
            store,
            llm,
            memory,
            params,
        }
    }

    pub fn params(&self) -> &AssistantParams {
        &self.params
    }

    /// Ingest one document. All-or-nothing.
    pub async fn ingest(
        &self,
        document: &Document,
        observer: &dyn IngestObserver,
    ) -> QaResult<IngestReport> {
        ingest_document(
            document,
            &self.segmenter,
            self.embedder.as_ref(),
            self.store.as_ref(),
            self.params.batch_size,
            observer,
        )
        .await
    }

    /// Answer `question` within `session_id`.
    ///
    /// `intent` overrides the keyword classifier when given.
    pub async fn ask(
        &self,
        session_id: &str,
        question: &str,
        intent: Option<Intent>,
    ) -> QaResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(QaError::invalid("question is empty"));
        }

        let history = self.memory.get_history(session_id);
        let intent = intent.unwrap_or_else(|| classify_question(question));

        let search_query = if history.is_empty() {
            question.to_string()
        } else {
            let prompt =
                build_rewrite_prompt(&history, question, intent, self.params.rewrite_turns);
            let rewritten = self
                .llm
                .complete(&prompt)
                .await
                .map_err(|e| QaError::upstream(Stage::Completion, e))?;
            let rewritten = rewritten.trim();
            if rewritten.is_empty() {
                question.to_string()
            } else {
                rewritten.to_string()
            }
        };

        let query_vec = embed_query(self.embedder.as_ref(), &search_query)
            .await
            .map_err(|e| QaError::upstream(Stage::Embedding, e))?;
        let candidates = retrieve(self.store.as_ref(), &query_vec, &self.params.retrieval)
            .await
            .map_err(|e| QaError::upstream(Stage::Search, e))?;
        let ranked = self.params.reranker.rerank(candidates, intent);

        let context = build_context(&ranked);
        let prompt = build_prompt(&context, &search_query, intent);
        let text = self
            .llm
            .complete(&prompt)
            .await
            .map_err(|e| QaError::upstream(Stage::Completion, e))?;

        let sources = collect_sources(&ranked, self.params.max_sources);
        self.memory.add_turn(session_id, &search_query, &text);

        Ok(Answer {
            text,
            sources,
            intent,
            search_query,
            context_used: ranked.len(),
        })
    }

    /// Drop a session's history. `false` if the session did not exist.
    pub fn clear_history(&self, session_id: &str) -> bool {
        self.memory.clear(session_id)
    }

    pub fn session_info(&self, session_id: &str) -> SessionInfo {
        self.memory.session_info(session_id)
    }

    pub async fn stats(&self) -> QaResult<AssistantStats> {
        let memory = self.memory.stats();
        let documents_in_db = self
            .store
            .count()
            .await
            .map_err(|e| QaError::upstream(Stage::Store, e))?;
        let chunks_by_category = self
            .store
            .count_by_category()
            .await
            .map_err(|e| QaError::upstream(Stage::Store, e))?
            .into_iter()
            .collect();
        Ok(AssistantStats {
            active_sessions: memory.active_sessions,
            total_messages: memory.total_messages,
            documents_in_db,
            chunks_by_category,
        })
    }
}
