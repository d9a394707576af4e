//! Chunk metadata builder.
//!
//! Every unit produced by the segmenter goes through [`build_chunk`], which
//! attaches the category, the priority implied by it, and the provenance of
//! the page it came from. Each chunk receives a random UUID plus a SHA-256
//! hash of its text.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{Category, Chunk, Provenance};

/// Create a single [`Chunk`] with a UUID and SHA-256 content hash.
pub fn build_chunk(text: &str, category: Category, provenance: &Provenance, index: i64) -> Chunk {
    Chunk {
        id: Uuid::new_v4().to_string(),
        chunk_index: index,
        text: text.to_string(),
        category,
        priority: category.priority(),
        provenance: provenance.clone(),
        hash: content_hash(text),
    }
}

/// Hex-encoded SHA-256 of `text`.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
