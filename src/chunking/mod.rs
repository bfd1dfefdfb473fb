//! Recursive character text splitting.
//!
//! Long documents are cut into overlapping chunks before summarization. The
//! splitter prefers structural boundaries: it splits on paragraph breaks
//! first, then line breaks, then spaces, and only cuts inside a word when a
//! single word is longer than a whole chunk.

use crate::error::{ChatcastError, Result};
use std::collections::VecDeque;

/// Separators tried in order, coarsest first.
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Maximum number of characters carried over from one chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
        }
    }
}

/// Splits text into overlapping chunks on structural boundaries.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: ChunkingConfig,
}

impl TextSplitter {
    /// Create a splitter, rejecting configurations that cannot make progress.
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        if config.chunk_size == 0 {
            return Err(ChatcastError::Config("chunk_size must be positive".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(ChatcastError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        Ok(Self { config })
    }

    /// Split `text` into chunks of at most `chunk_size` characters.
    ///
    /// Whitespace-only input produces no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) <= self.config.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }

        chunks
    }

    /// Greedily join small pieces into chunks, seeding each new chunk with
    /// the tail of the previous one.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;
        let sep_len = char_len(separator);

        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > size && !current.is_empty() {
                push_chunk(&mut chunks, &current, separator);

                // Drop from the front until the remainder fits as overlap.
                while let Some(&front) = current.front() {
                    if total <= overlap && total + len + sep_len <= size {
                        break;
                    }
                    total -= char_len(front) + if current.len() > 1 { sep_len } else { 0 };
                    current.pop_front();
                }
            }

            if !current.is_empty() {
                total += sep_len;
            }
            current.push_back(piece);
            total += len;
        }

        push_chunk(&mut chunks, &current, separator);
        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            config: ChunkingConfig::default(),
        }
    }
}

fn push_chunk(chunks: &mut Vec<String>, pieces: &VecDeque<&str>, separator: &str) {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{:04}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split("  Study shows X improves Y.  ");
        assert_eq!(chunks, vec!["Study shows X improves Y.".to_string()]);
    }

    #[test]
    fn test_whitespace_yields_no_chunks() {
        let splitter = TextSplitter::default();
        assert!(splitter.split(" \n\n \t").is_empty());
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        let err = TextSplitter::new(ChunkingConfig {
            chunk_size: 100,
            chunk_overlap: 100,
        })
        .unwrap_err();
        assert!(matches!(err, ChatcastError::Config(_)));
        assert!(TextSplitter::new(ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        })
        .is_err());
    }

    #[test]
    fn test_long_text_chunks_fit_and_overlap() {
        let splitter = TextSplitter::default();
        let text = words(1000);
        let chunks = splitter.split(&text);

        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 2000);
            // No word is ever cut in half.
            for token in chunk.split(' ') {
                assert_eq!(token.len(), 5, "unexpected token {:?}", token);
                assert!(token.starts_with('w'));
            }
        }

        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(pair[0].contains(first_word), "chunks should overlap");
        }

        assert!(chunks[0].starts_with("w0000"));
        assert!(chunks.last().unwrap().ends_with("w0999"));
    }

    #[test]
    fn test_paragraph_boundaries_preferred() {
        let splitter = TextSplitter::default();
        let first = "a".repeat(1500);
        let second = "b".repeat(1500);
        let chunks = splitter.split(&format!("{}\n\n{}", first, second));

        assert_eq!(chunks, vec![first, second]);
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = TextSplitter::new(ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 2,
        })
        .unwrap();
        let chunks = splitter.split("abcdefghijklmnopqrstuvwxy");

        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks[0], "abcdefghij");
        assert!(chunks[1].starts_with("ij"));
    }

    #[test]
    fn test_multibyte_characters_counted_as_chars() {
        let splitter = TextSplitter::new(ChunkingConfig {
            chunk_size: 4,
            chunk_overlap: 0,
        })
        .unwrap();
        let chunks = splitter.split("ééééüüüü");
        assert_eq!(chunks, vec!["éééé".to_string(), "üüüü".to_string()]);
    }
}
