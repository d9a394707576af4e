//! Core data models used throughout Manual QA.
//!
//! These types represent the pages, chunks, and retrieval results that flow
//! through the ingestion and question-answering pipelines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content category of a [`Chunk`], assigned once at creation.
///
/// `Safety` and `ProcedureStep` come from pattern extraction; the other
/// three are assigned to residual passages by the chunk classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Safety,
    ProcedureStep,
    Reference,
    Specification,
    Content,
}

impl Category {
    /// Every category, in extraction order.
    pub const ALL: [Category; 5] = [
        Category::Safety,
        Category::ProcedureStep,
        Category::Reference,
        Category::Specification,
        Category::Content,
    ];

    /// Stable identifier stored alongside the chunk (`"procedure_step"`, …).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Safety => "safety",
            Category::ProcedureStep => "procedure_step",
            Category::Reference => "reference",
            Category::Specification => "specification",
            Category::Content => "content",
        }
    }

    /// Retrieval priority implied by the category. Only safety is `High`.
    pub fn priority(&self) -> Priority {
        match self {
            Category::Safety => Priority::High,
            _ => Priority::Medium,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown chunk category: {}", s))
    }
}

/// Retrieval priority of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            other => anyhow::bail!("unknown chunk priority: {}", other),
        }
    }
}

/// Where a chunk came from: the source document and its page number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    /// Source document identifier (the uploaded file name).
    pub source: String,
    /// Page number within the source, starting at 1.
    pub page: u32,
}

impl Provenance {
    pub fn new(source: impl Into<String>, page: u32) -> Self {
        Self {
            source: source.into(),
            page,
        }
    }

    /// Citation label used in answers, e.g. `"press.pdf (page 3)"`.
    pub fn label(&self) -> String {
        format!("{} (page {})", self.source, self.page)
    }
}

/// A retrievable unit of manual text.
///
/// Chunks are built once during ingestion (see [`crate::metadata`]) and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk UUID.
    pub id: String,
    /// Position of the chunk within its ingestion call, starting at 0.
    pub chunk_index: i64,
    /// Trimmed passage text.
    pub text: String,
    pub category: Category,
    pub priority: Priority,
    pub provenance: Provenance,
    /// SHA-256 of `text`.
    pub hash: String,
}

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

/// A document handed to the segmenter: a source name and its pages in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pages: Vec::new(),
        }
    }

    /// Builder-style page append.
    pub fn with_page(mut self, number: u32, text: impl Into<String>) -> Self {
        self.pages.push(Page {
            number,
            text: text.into(),
        });
        self
    }

    /// True when no page carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }
}

/// A chunk returned by retrieval, with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    /// Cosine similarity to the query vector.
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip_str() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert!("warning".parse::<Category>().is_err());
    }

    #[test]
    fn test_only_safety_is_high_priority() {
        for c in Category::ALL {
            let expected = if c == Category::Safety {
                Priority::High
            } else {
                Priority::Medium
            };
            assert_eq!(c.priority(), expected);
        }
    }

    #[test]
    fn test_provenance_label() {
        assert_eq!(
            Provenance::new("press.pdf", 3).label(),
            "press.pdf (page 3)"
        );
    }

    #[test]
    fn test_blank_document() {
        assert!(Document::new("a.pdf").is_blank());
        assert!(Document::new("a.pdf").with_page(1, "  \n ").is_blank());
        assert!(!Document::new("a.pdf").with_page(1, "text").is_blank());
    }
}
