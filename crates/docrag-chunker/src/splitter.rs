//! Recursive token-bounded splitting with overlap.

use docrag_core::{Chunk, ChunkError, ChunkMetadata, Page};
use tiktoken_rs::{cl100k_base, CoreBPE};
use tracing::debug;

/// Separator ladder, coarsest first. A finer separator is only used for
/// pieces that still exceed the token budget at the current granularity.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Token-bounded text splitter.
///
/// The same tokenizer (`cl100k_base`) is used both to bound chunk size and
/// to report each chunk's `token_count`, so the two never disagree.
pub struct TokenSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    bpe: CoreBPE,
}

impl TokenSplitter {
    /// Create a splitter with the given token budget and overlap.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkError> {
        if chunk_size == 0 {
            return Err(ChunkError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkError::InvalidConfig(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        let bpe = cl100k_base().map_err(|e| ChunkError::Tokenizer(e.to_string()))?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
            bpe,
        })
    }

    /// Count tokens with the same encoding used for splitting.
    pub fn token_len(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Split text into pieces of at most `chunk_size` tokens.
    ///
    /// Input within the budget is returned unchanged as a single piece with
    /// no overlap applied. Empty input yields no pieces.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if self.token_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        self.split_recursive(text, &SEPARATORS)
    }

    /// Chunk one page of text with page-local indices.
    pub fn chunk_page(
        &self,
        text: &str,
        document_id: &str,
        document_name: &str,
        page_number: Option<u32>,
    ) -> Vec<Chunk> {
        let pieces = self.split_text(text);
        let total = pieces.len() as u32;

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, content)| {
                let token_count = self.token_len(&content);
                Chunk {
                    chunk_index: i as u32,
                    page_number,
                    token_count,
                    metadata: ChunkMetadata {
                        document_id: document_id.to_string(),
                        document_name: document_name.to_string(),
                        chunk_index: i as u32,
                        page_number,
                        total_chunks: total,
                    },
                    content,
                }
            })
            .collect()
    }

    /// Chunk every page independently, then renumber globally.
    ///
    /// A chunk never spans two pages. The second pass consumes the ordered
    /// per-page batches and emits a freshly indexed flat sequence with the
    /// final `total_chunks` on every chunk, rather than patching the
    /// per-page records in place.
    pub fn chunk_pages(
        &self,
        pages: &[Page],
        document_id: &str,
        document_name: &str,
    ) -> Vec<Chunk> {
        let batches: Vec<Vec<Chunk>> = pages
            .iter()
            .map(|page| {
                self.chunk_page(
                    &page.content,
                    document_id,
                    document_name,
                    Some(page.page_number),
                )
            })
            .collect();

        let chunks = renumber(batches);
        debug!(
            document = document_name,
            pages = pages.len(),
            chunks = chunks.len(),
            "chunked document"
        );
        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (sep, finer) = match separators.split_first() {
            Some((s, rest)) => (*s, rest),
            // No finer granularity left; accept the oversized piece.
            None => return vec![text.to_string()],
        };

        let mut pieces: Vec<String> = Vec::new();
        for part in text.split(sep) {
            if part.is_empty() {
                continue;
            }
            if self.token_len(part) > self.chunk_size {
                pieces.extend(self.split_recursive(part, finer));
            } else {
                pieces.push(part.to_string());
            }
        }

        self.merge_pieces(pieces, sep)
    }

    /// Greedily merge pieces back up to the token budget, carrying a
    /// best-effort trailing window of up to `chunk_overlap` tokens into the
    /// next chunk.
    fn merge_pieces(&self, pieces: Vec<String>, sep: &str) -> Vec<String> {
        let window_tokens = |window: &[String]| -> usize {
            if window.is_empty() {
                0
            } else {
                self.token_len(&window.join(sep))
            }
        };

        let mut chunks: Vec<String> = Vec::new();
        let mut window: Vec<String> = Vec::new();

        for piece in pieces {
            let piece_tokens = self.token_len(&piece);

            if !window.is_empty()
                && window_tokens(&window) + piece_tokens > self.chunk_size
            {
                chunks.push(window.join(sep));

                // Retain a trailing overlap that also leaves room for the
                // incoming piece.
                while !window.is_empty()
                    && (window_tokens(&window) > self.chunk_overlap
                        || window_tokens(&window) + piece_tokens > self.chunk_size)
                {
                    window.remove(0);
                }
            }

            window.push(piece);
        }

        if !window.is_empty() {
            chunks.push(window.join(sep));
        }

        chunks
    }
}

/// Flatten ordered per-page chunk batches into one globally indexed
/// sequence with `total_chunks` backfilled.
fn renumber(batches: Vec<Vec<Chunk>>) -> Vec<Chunk> {
    let total = batches.iter().map(Vec::len).sum::<usize>() as u32;

    batches
        .into_iter()
        .flatten()
        .enumerate()
        .map(|(i, chunk)| Chunk {
            chunk_index: i as u32,
            metadata: ChunkMetadata {
                chunk_index: i as u32,
                total_chunks: total,
                ..chunk.metadata
            },
            ..chunk
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn page(n: u32, content: &str) -> Page {
        Page {
            page_number: n,
            content: content.to_string(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_invalid_zero_chunk_size() {
        let err = match TokenSplitter::new(0, 0) {
            Ok(_) => panic!("expected an error for zero chunk size"),
            Err(e) => e,
        };
        assert!(matches!(err, ChunkError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_overlap_not_smaller_than_size() {
        let err = match TokenSplitter::new(100, 100) {
            Ok(_) => panic!("expected an error for overlap not smaller than size"),
            Err(e) => e,
        };
        assert!(matches!(err, ChunkError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_text_yields_no_pieces() {
        let splitter = TokenSplitter::new(100, 20).unwrap();
        assert!(splitter.split_text("").is_empty());
    }

    #[test]
    fn test_short_text_single_piece_equals_input() {
        let splitter = TokenSplitter::new(1000, 200).unwrap();
        let text = "Short text.";
        let pieces = splitter.split_text(text);
        assert_eq!(pieces, vec![text.to_string()]);
    }

    #[test]
    fn test_long_text_splits_within_budget() {
        let splitter = TokenSplitter::new(100, 20).unwrap();
        let text = "This is a test paragraph with several words in it. ".repeat(40);
        let pieces = splitter.split_text(&text);

        assert!(pieces.len() > 1, "should split into multiple pieces");
        for piece in &pieces {
            assert!(
                splitter.token_len(piece) <= 100,
                "piece exceeds budget: {} tokens",
                splitter.token_len(piece)
            );
        }
    }

    #[test]
    fn test_splitting_is_deterministic() {
        let splitter = TokenSplitter::new(80, 16).unwrap();
        let text = format!(
            "{}\n\n{}\n\n{}",
            "First section sentence one. Sentence two here. ".repeat(10),
            "Second section with different words entirely. ".repeat(10),
            "Third and final section closes the document. ".repeat(10),
        );

        let first = splitter.split_text(&text);
        let second = splitter.split_text(&text);
        assert_eq!(first, second);
    }

    #[test]
    fn test_paragraph_boundaries_preferred() {
        let splitter = TokenSplitter::new(60, 0).unwrap();
        let para_a = "Alpha sentence repeated for bulk. ".repeat(6);
        let para_b = "Beta sentence repeated for bulk. ".repeat(6);
        let text = format!("{}\n\n{}", para_a.trim(), para_b.trim());

        let pieces = splitter.split_text(&text);
        // Each paragraph fits the budget on its own, so the paragraph break
        // is the only split point used.
        assert_eq!(pieces.len(), 2);
        assert!(pieces[0].starts_with("Alpha"));
        assert!(pieces[1].starts_with("Beta"));
    }

    #[test]
    fn test_overlap_carries_trailing_content() {
        let splitter = TokenSplitter::new(50, 20).unwrap();
        let text = "one two three four five six seven eight nine ten ".repeat(20);
        let pieces = splitter.split_text(&text);

        assert!(pieces.len() > 1);
        // The head of each piece repeats words from the tail of the prior one.
        let tail: Vec<&str> = pieces[0].split_whitespace().rev().take(3).collect();
        assert!(tail.iter().all(|w| pieces[1].contains(w)));
    }

    #[test]
    fn test_token_count_matches_length_function() {
        let splitter = TokenSplitter::new(64, 8).unwrap();
        let chunks = splitter.chunk_page(
            &"Counting tokens consistently matters. ".repeat(20),
            "doc-1",
            "notes.txt",
            None,
        );

        for chunk in &chunks {
            assert_eq!(chunk.token_count, splitter.token_len(&chunk.content));
        }
    }

    #[test]
    fn test_chunk_page_empty_content_yields_nothing() {
        let splitter = TokenSplitter::new(100, 20).unwrap();
        let chunks = splitter.chunk_page("", "doc-1", "empty.txt", Some(1));
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_pages_dense_global_indices() {
        let splitter = TokenSplitter::new(40, 8).unwrap();
        let pages = vec![
            page(1, &"First page content repeated for volume. ".repeat(15)),
            page(2, &"Second page content repeated for volume. ".repeat(15)),
        ];

        let chunks = splitter.chunk_pages(&pages, "doc-1", "report.pdf");
        let n = chunks.len() as u32;
        assert!(n > 2);

        let mut indices: Vec<u32> = chunks.iter().map(|c| c.chunk_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..n).collect::<Vec<_>>());

        for chunk in &chunks {
            assert_eq!(chunk.metadata.chunk_index, chunk.chunk_index);
            assert_eq!(chunk.metadata.total_chunks, n);
            assert_eq!(chunk.metadata.document_id, "doc-1");
        }
    }

    #[test]
    fn test_chunk_pages_never_spans_pages() {
        let splitter = TokenSplitter::new(1000, 100).unwrap();
        let pages = vec![page(1, "only page one words"), page(2, "only page two words")];

        let chunks = splitter.chunk_pages(&pages, "doc-1", "two.pdf");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, Some(1));
        assert_eq!(chunks[1].page_number, Some(2));
        assert!(!chunks[0].content.contains("page two"));
    }

    #[test]
    fn test_chunk_pages_skips_empty_page() {
        let splitter = TokenSplitter::new(100, 10).unwrap();
        let pages = vec![page(1, "content here"), page(2, ""), page(3, "more content")];

        let chunks = splitter.chunk_pages(&pages, "doc-1", "gaps.pdf");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page_number, Some(1));
        assert_eq!(chunks[1].page_number, Some(3));
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn test_single_page_ordering_matches_emission() {
        let splitter = TokenSplitter::new(30, 0).unwrap();
        let text = "alpha beta gamma delta. ".repeat(20);
        let chunks = splitter.chunk_page(&text, "doc-1", "one.txt", Some(1));

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
        }
    }
}
