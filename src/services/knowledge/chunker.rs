//! Document Chunker
//!
//! Splits source documents into overlapping chunks sized for embedding.
//! Chunks prefer to end on a sentence boundary so retrieved context reads
//! cleanly inside agent prompts.

/// Overlapping text chunker with sentence-boundary snapping.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Target characters per chunk.
    chunk_size: usize,
    /// Characters of overlap between consecutive chunks.
    overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

impl TextChunker {
    /// Create a chunker. `overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Split text into overlapping chunks.
    ///
    /// A window ends at the last sentence terminator past the midpoint
    /// when one exists, otherwise at the raw size limit. Empty chunks are
    /// dropped.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            let trimmed = text.trim();
            return if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            };
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < chars.len() {
            let mut end = (start + self.chunk_size).min(chars.len());
            if end < chars.len() {
                if let Some(boundary) = self.sentence_boundary(&chars[start..end]) {
                    end = start + boundary;
                }
            }

            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }

            if end >= chars.len() {
                break;
            }
            start = end.saturating_sub(self.overlap);
        }
        chunks
    }

    /// Index just past the last sentence terminator in the window, if it
    /// falls in the second half.
    fn sentence_boundary(&self, window: &[char]) -> Option<usize> {
        let min = self.chunk_size / 2;
        for i in (min..window.len().saturating_sub(1)).rev() {
            let c = window[i];
            let next = window[i + 1];
            if matches!(c, '.' | '!' | '?') && next.is_whitespace() {
                return Some(i + 1);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunker = TextChunker::new(500, 50);
        let chunks = chunker.chunk("A short regulation note.");
        assert_eq!(chunks, vec!["A short regulation note.".to_string()]);
    }

    #[test]
    fn test_empty_text_no_chunks() {
        let chunker = TextChunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("   \n  ").is_empty());
    }

    #[test]
    fn test_long_text_overlapping_chunks() {
        let chunker = TextChunker::new(100, 20);
        let sentence = "The procurement committee approved the award. ";
        let text = sentence.repeat(20);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() > 1);
        // Every chunk respects the size limit (plus a little slack for
        // boundary snapping never exceeding the raw window).
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "oversized chunk: {}", chunk);
        }
    }

    #[test]
    fn test_chunks_prefer_sentence_boundaries() {
        let chunker = TextChunker::new(80, 10);
        let text = "First sentence about bribery. Second sentence about the tender process. \
                    Third sentence about evidence collection and the audit trail of approvals.";
        let chunks = chunker.chunk(text);
        assert!(chunks.len() >= 2);
        assert!(chunks[0].ends_with('.'), "chunk was: {:?}", chunks[0]);
    }

    #[test]
    fn test_overlap_repeats_tail_content() {
        let chunker = TextChunker::new(60, 20);
        let text = "abcdefghij ".repeat(20);
        let chunks = chunker.chunk(&text);
        assert!(chunks.len() >= 2);
        // The start of chunk N+1 appears inside chunk N because of overlap.
        let head: String = chunks[1].chars().take(5).collect();
        assert!(chunks[0].contains(&head));
    }

    #[test]
    fn test_overlap_clamped_below_chunk_size() {
        // Would loop forever if overlap >= chunk_size were allowed.
        let chunker = TextChunker::new(10, 50);
        let chunks = chunker.chunk(&"word ".repeat(50));
        assert!(!chunks.is_empty());
    }
}
