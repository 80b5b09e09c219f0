//! Corpus chunking.
//!
//! This module provides the [`Chunker`] trait and [`ParagraphChunker`],
//! which splits text on paragraph boundaries and falls back to sentence
//! boundaries for paragraphs that exceed the size limit.

/// A strategy for splitting corpus text into bounded-size passages.
///
/// Implementations produce non-empty chunks in source order. Chunk
/// boundaries may vary by strategy, but content is never dropped.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` for blank input. No returned chunk is empty.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into chunks of at most `max_size` characters along
/// paragraph boundaries, preferring not to cut mid-sentence.
///
/// Paragraphs (separated by blank lines) are greedily accumulated into a
/// buffer joined with `"\n\n"`; when the next paragraph would overflow
/// the buffer, the buffer is flushed as a chunk. A paragraph that is
/// itself larger than `max_size` is split on sentence boundaries
/// (`.`, `!`, `?` followed by whitespace) and accumulated the same way,
/// joined with a single space.
///
/// A single sentence longer than `max_size` becomes one oversized chunk:
/// content is never truncated.
///
/// # Example
///
/// ```rust,ignore
/// use yanomami_rag::ParagraphChunker;
///
/// let chunker = ParagraphChunker::new(1000);
/// let chunks = chunker.chunk(&corpus_text);
/// ```
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    max_size: usize,
}

impl ParagraphChunker {
    /// Create a new `ParagraphChunker` with the given maximum chunk size
    /// in characters.
    pub fn new(max_size: usize) -> Self {
        Self { max_size }
    }
}

/// Split a paragraph into sentences at `.`, `!`, or `?` followed by
/// whitespace, keeping the terminator attached to the preceding sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(next_start, next)) = iter.peek() {
                if next.is_whitespace() {
                    let sentence = text[start..i + c.len_utf8()].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = next_start;
                }
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

impl Chunker for ParagraphChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();

        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }

            if paragraph.len() > self.max_size {
                // Paragraph alone overflows a chunk: accumulate at
                // sentence granularity instead, joined by single spaces.
                for sentence in split_sentences(paragraph) {
                    if !current.is_empty()
                        && current.len() + 1 + sentence.len() > self.max_size
                    {
                        chunks.push(std::mem::take(&mut current));
                    }
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.push_str(sentence);
                }
            } else {
                if !current.is_empty()
                    && current.len() + 2 + paragraph.len() > self.max_size
                {
                    chunks.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(paragraph);
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, max_size: usize) -> Vec<String> {
        ParagraphChunker::new(max_size).chunk(text)
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk("", 1000).is_empty());
        assert!(chunk("  \n\n  \n\n", 1000).is_empty());
    }

    #[test]
    fn input_under_max_yields_one_trimmed_chunk() {
        let chunks = chunk("  hello world  ", 1000);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn paragraphs_under_max_stay_together() {
        let chunks = chunk("first paragraph.\n\nsecond paragraph.", 1000);
        assert_eq!(chunks, vec!["first paragraph.\n\nsecond paragraph.".to_string()]);
    }

    #[test]
    fn paragraphs_flush_when_buffer_would_overflow() {
        let a = "a".repeat(60);
        let b = "b".repeat(60);
        let chunks = chunk(&format!("{a}\n\n{b}"), 100);
        assert_eq!(chunks, vec![a, b]);
    }

    #[test]
    fn long_paragraph_splits_on_sentence_boundaries() {
        // Four sentences of 40 chars each in a single 160+ char paragraph.
        let sentence = format!("{}.", "x".repeat(39));
        let paragraph = vec![sentence.clone(); 4].join(" ");
        let chunks = chunk(&paragraph, 100);

        assert!(chunks.len() > 1, "expected multiple chunks, got {chunks:?}");
        for c in &chunks {
            assert!(c.len() <= 100, "chunk exceeds max: {} chars", c.len());
            assert!(!c.is_empty());
        }
    }

    #[test]
    fn oversized_single_sentence_is_one_oversized_chunk() {
        let sentence = "y".repeat(500);
        let chunks = chunk(&sentence, 100);
        assert_eq!(chunks, vec![sentence]);
    }

    #[test]
    fn sentence_terminators_are_kept() {
        let chunks = chunk("Is it bright? Yes! Very much so. Indeed.", 12);
        assert_eq!(chunks, vec!["Is it bright?", "Yes!", "Very much so.", "Indeed."]);
    }

    #[test]
    fn no_content_is_lost() {
        let text = "The sun is bright.\n\nWater is wet. Stones are hard.\n\nFire is hot.";
        let chunks = chunk(text, 25);

        let original_words: Vec<&str> = text.split_whitespace().collect();
        let rejoined = chunks.join(" ");
        let chunk_words: Vec<&str> = rejoined.split_whitespace().collect();
        assert_eq!(original_words, chunk_words);
    }

    #[test]
    fn chunk_order_follows_source_order() {
        let text = "alpha.\n\nbravo.\n\ncharlie.\n\ndelta.";
        let chunks = chunk(text, 8);
        assert_eq!(chunks, vec!["alpha.", "bravo.", "charlie.", "delta."]);
    }
}
