//! Recursive separator-aware text splitter.
//!
//! Splits residual manual text into bounded passages. The splitter tries the
//! highest-priority separator present in the text first and only descends to
//! a lower-priority separator for pieces that are still too large.
//!
//! # Algorithm
//!
//! 1. Pick the first separator in the list that occurs in the text.
//! 2. Split on it, keeping each separator attached to the start of the
//!    piece that follows it.
//! 3. Pieces shorter than `chunk_size` are buffered; an oversized piece
//!    flushes the buffer and is split recursively with the remaining
//!    separators (or emitted whole when none remain).
//! 4. Buffered pieces are merged into windows of at most `chunk_size`
//!    characters. When a window is emitted, pieces are dropped from its
//!    front until at most `chunk_overlap` characters remain, and those
//!    carry over into the next window.
//!
//! All lengths are measured in characters, not bytes.

use std::collections::VecDeque;

/// Separators in priority order.
pub const SEPARATORS: [&str; 9] = [
    "\n\n## ", "\n\n", "\n• ", "\n- ", "\n", ". ", "; ", ", ", " ",
];

/// Sliding-window recursive splitter.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter<'a> {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &'a [&'a str],
}

impl<'a> RecursiveSplitter<'a> {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &'a [&'a str]) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators,
        }
    }

    /// Split `text` into trimmed, non-empty windows.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, self.separators)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, rest): (&str, &[&str]) =
            match separators.iter().position(|s| text.contains(s)) {
                Some(i) => (separators[i], &separators[i + 1..]),
                None => (separators.last().copied().unwrap_or(""), &[]),
            };

        let mut chunks = Vec::new();
        let mut buffered: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                buffered.push(piece);
                continue;
            }
            if !buffered.is_empty() {
                chunks.extend(self.merge(&buffered));
                buffered.clear();
            }
            if rest.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }

        if !buffered.is_empty() {
            chunks.extend(self.merge(&buffered));
        }

        chunks
    }

    /// Merge small pieces into overlapping windows.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_window(&mut windows, &current);
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }

        push_window(&mut windows, &current);
        windows
    }
}

fn push_window(windows: &mut Vec<String>, pieces: &VecDeque<&str>) {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

/// Split on `separator`, attaching each separator to the following piece.
/// Empty pieces are dropped. An empty separator splits into characters.
fn split_keeping_separator<'t>(text: &'t str, separator: &str) -> Vec<&'t str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splitter(size: usize, overlap: usize) -> RecursiveSplitter<'static> {
        RecursiveSplitter::new(size, overlap, &SEPARATORS)
    }

    #[test]
    fn test_small_text_single_window() {
        let out = splitter(650, 130).split("Short paragraph.\n\nAnother one.");
        assert_eq!(out, vec!["Short paragraph.\n\nAnother one.".to_string()]);
    }

    #[test]
    fn test_separator_kept_on_following_piece() {
        let pieces = split_keeping_separator("a\n\nb\n\nc", "\n\n");
        assert_eq!(pieces, vec!["a", "\n\nb", "\n\nc"]);
    }

    #[test]
    fn test_leading_and_repeated_separators() {
        let pieces = split_keeping_separator("\n\nx\n\n\n\ny", "\n\n");
        assert_eq!(pieces, vec!["\n\nx", "\n\n", "\n\ny"]);
    }

    #[test]
    fn test_windows_respect_chunk_size() {
        let text = (0..40)
            .map(|i| format!("Sentence number {} describes the conveyor.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let out = splitter(200, 40).split(&text);
        assert!(out.len() > 1);
        for w in &out {
            assert!(w.chars().count() <= 200, "window too long: {}", w.len());
        }
    }

    #[test]
    fn test_consecutive_windows_overlap() {
        let text = (0..60)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let out = splitter(50, 15).split(&text);
        assert!(out.len() > 2);
        for pair in out.windows(2) {
            let last_word = pair[0].split(' ').last().unwrap();
            assert!(
                pair[1].split(' ').any(|w| w == last_word),
                "expected {:?} to carry over into {:?}",
                last_word,
                pair[1]
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let para_a = "A".repeat(300);
        let para_b = "B".repeat(300);
        let text = format!("{}\n\n{}", para_a, para_b);
        let out = splitter(400, 0).split(&text);
        assert_eq!(out, vec![para_a, para_b]);
    }

    #[test]
    fn test_unsplittable_piece_emitted_whole() {
        let blob = "x".repeat(900);
        let out = splitter(650, 130).split(&blob);
        assert_eq!(out, vec![blob]);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Température 80°C — vérifier. ".repeat(50);
        let out = splitter(120, 20).split(&text);
        assert!(!out.is_empty());
        for w in &out {
            assert!(w.chars().count() <= 120);
        }
    }

    #[test]
    fn test_empty_text() {
        assert!(splitter(650, 130).split("").is_empty());
        assert!(splitter(650, 130).split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha beta gamma. ".repeat(100);
        assert_eq!(splitter(120, 30).split(&text), splitter(120, 30).split(&text));
    }
}
