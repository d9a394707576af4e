//! Domain-aware segmenter for technical manuals.
//!
//! Turns the raw text of each page into typed [`Chunk`]s. Segmentation is a
//! pipeline of extract-and-consume stages run in a fixed order, followed by
//! generic splitting of whatever text is left:
//!
//! 1. **Safety**: blocks starting with `WARNING`, `CAUTION`, or `DANGER`
//!    at line start (case-insensitive), plus any non-blank lines that follow.
//! 2. **Procedure steps**: blocks starting with `<n>. ` at line start,
//!    plus up to three continuation lines.
//! 3. **Residual**: the remaining text, split by
//!    [`RecursiveSplitter`](crate::split::RecursiveSplitter) and labelled by
//!    [`classify`](crate::classify::classify).
//!
//! Each stage removes every span it matched (including matches too short to
//! become chunks), so later stages never see text an earlier stage consumed.
//!
//! # Example
//!
//! ```rust
//! use manual_qa_core::models::{Category, Document};
//! use manual_qa_core::segment::Segmenter;
//!
//! let doc = Document::new("press.pdf").with_page(
//!     1,
//!     "WARNING: Lock out the hydraulic supply before opening the guard door.\n",
//! );
//! let chunks = Segmenter::default().segment(&doc);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].category, Category::Safety);
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::classify;
use crate::metadata::build_chunk;
use crate::models::{Category, Chunk, Document, Provenance};
use crate::split::{RecursiveSplitter, SEPARATORS};

static SAFETY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^(?:WARNING|CAUTION|DANGER)[:\s][^\n]+(?:\n[^\n]+)*").unwrap()
});

static STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s+[^\n]+(?:\n[^\n]+){0,3}").unwrap());

/// Segmentation thresholds. Lengths are in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Target residual passage size.
    pub chunk_size: usize,
    /// Characters carried over between consecutive residual passages.
    pub chunk_overlap: usize,
    /// A safety block must be longer than this to become a chunk.
    pub min_safety_chars: usize,
    /// A procedure step must be longer than this to become a chunk.
    pub min_step_chars: usize,
    /// A residual passage must be longer than this to become a chunk.
    pub min_passage_chars: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 650,
            chunk_overlap: 130,
            min_safety_chars: 50,
            min_step_chars: 60,
            min_passage_chars: 80,
        }
    }
}

/// Output of one extraction stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Trimmed blocks long enough to become chunks.
    pub blocks: Vec<String>,
    /// Input text with every matched span removed.
    pub remaining: String,
}

/// A pattern-driven extract-and-consume stage.
#[derive(Debug, Clone, Copy)]
pub struct PatternStage {
    pub category: Category,
    pattern: &'static LazyLock<Regex>,
    min_chars: usize,
}

impl PatternStage {
    /// The safety-warning stage.
    pub fn safety(min_chars: usize) -> Self {
        Self {
            category: Category::Safety,
            pattern: &SAFETY_RE,
            min_chars,
        }
    }

    /// The numbered procedure-step stage.
    pub fn procedure_steps(min_chars: usize) -> Self {
        Self {
            category: Category::ProcedureStep,
            pattern: &STEP_RE,
            min_chars,
        }
    }

    /// Run the stage: collect qualifying blocks and strip all matches.
    pub fn extract(&self, text: &str) -> Extraction {
        let mut blocks = Vec::new();
        let mut remaining = String::with_capacity(text.len());
        let mut last_end = 0;

        for m in self.pattern.find_iter(text) {
            remaining.push_str(&text[last_end..m.start()]);
            last_end = m.end();

            let block = m.as_str().trim();
            if block.chars().count() > self.min_chars {
                blocks.push(block.to_string());
            }
        }
        remaining.push_str(&text[last_end..]);

        Extraction { blocks, remaining }
    }
}

/// Text segmenter: extraction stages followed by residual splitting.
#[derive(Debug, Clone)]
pub struct Segmenter {
    config: SegmenterConfig,
    stages: [PatternStage; 2],
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmenterConfig::default())
    }
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        let stages = [
            PatternStage::safety(config.min_safety_chars),
            PatternStage::procedure_steps(config.min_step_chars),
        ];
        Self { config, stages }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment every page of `document`, in page order.
    ///
    /// Chunk indices are contiguous across the whole document.
    pub fn segment(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in &document.pages {
            let provenance = Provenance::new(document.source.clone(), page.number);
            for (category, text) in self.segment_text(&page.text) {
                let index = chunks.len() as i64;
                chunks.push(build_chunk(&text, category, &provenance, index));
            }
        }
        chunks
    }

    /// Segment a single page of text into `(category, text)` pairs.
    ///
    /// Safety blocks come first, then procedure steps, then residual
    /// passages in reading order.
    pub fn segment_text(&self, text: &str) -> Vec<(Category, String)> {
        let mut out = Vec::new();
        let mut working = text.to_string();

        for stage in &self.stages {
            let extraction = stage.extract(&working);
            out.extend(extraction.blocks.into_iter().map(|b| (stage.category, b)));
            working = extraction.remaining;
        }

        for passage in self.split_residual(&working) {
            out.push((classify(&passage), passage));
        }
        out
    }

    /// Split residual text into passages above the length floor.
    pub fn split_residual(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        RecursiveSplitter::new(self.config.chunk_size, self.config.chunk_overlap, &SEPARATORS)
            .split(text)
            .into_iter()
            .map(|piece| piece.trim().to_string())
            .filter(|piece| piece.chars().count() > self.config.min_passage_chars)
            .collect()
    }
}
