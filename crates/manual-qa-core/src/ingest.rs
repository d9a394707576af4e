//! Ingestion pipeline: segment, embed, store.
//!
//! One call ingests one document. Nothing is written unless segmentation
//! produced chunks and every batch embedded successfully; the store then
//! receives all chunks in a single [`VectorStore::add_chunks`] call.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, QaResult, Stage};
use crate::models::Document;
use crate::segment::Segmenter;
use crate::store::VectorStore;

/// Progress notifications emitted while a document is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IngestEvent {
    Segmented { pages: usize, chunks: usize },
    Embedding { done: usize, total: usize },
    Stored { chunks: usize },
}

/// Receives [`IngestEvent`]s. Implementations decide where they go.
pub trait IngestObserver: Send + Sync {
    fn on_event(&self, source: &str, event: IngestEvent);
}

/// Observer that discards every event.
pub struct NoProgress;

impl IngestObserver for NoProgress {
    fn on_event(&self, _source: &str, _event: IngestEvent) {}
}

/// Summary of one ingestion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub source: String,
    pub pages: usize,
    pub chunks_added: usize,
    /// Category name → number of chunks.
    pub chunk_types: BTreeMap<String, usize>,
}

/// Segment `document`, embed its chunks in batches of `batch_size`, and
/// persist them.
pub async fn ingest_document(
    document: &Document,
    segmenter: &Segmenter,
    embedder: &dyn EmbeddingProvider,
    store: &dyn VectorStore,
    batch_size: usize,
    observer: &dyn IngestObserver,
) -> QaResult<IngestReport> {
    if document.pages.is_empty() || document.is_blank() {
        return Err(QaError::invalid(format!(
            "{} contains no extractable text",
            document.source
        )));
    }

    let chunks = segmenter.segment(document);
    observer.on_event(
        &document.source,
        IngestEvent::Segmented {
            pages: document.pages.len(),
            chunks: chunks.len(),
        },
    );
    if chunks.is_empty() {
        return Err(QaError::invalid(format!(
            "{} produced no chunks",
            document.source
        )));
    }

    let total = chunks.len();
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(total);
    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embedded = embedder
            .embed(&texts)
            .await
            .map_err(|e| QaError::upstream(Stage::Embedding, e))?;
        if embedded.len() != texts.len() {
            return Err(QaError::upstream(
                Stage::Embedding,
                anyhow::anyhow!(
                    "expected {} embeddings, received {}",
                    texts.len(),
                    embedded.len()
                ),
            ));
        }
        vectors.extend(embedded);
        observer.on_event(
            &document.source,
            IngestEvent::Embedding {
                done: vectors.len(),
                total,
            },
        );
    }

    store
        .add_chunks(&chunks, &vectors)
        .await
        .map_err(|e| QaError::upstream(Stage::Store, e))?;
    observer.on_event(&document.source, IngestEvent::Stored { chunks: total });

    let mut chunk_types: BTreeMap<String, usize> = BTreeMap::new();
    for c in &chunks {
        *chunk_types.entry(c.category.as_str().to_string()).or_insert(0) += 1;
    }

    Ok(IngestReport {
        source: document.source.clone(),
        pages: document.pages.len(),
        chunks_added: total,
        chunk_types,
    })
}
