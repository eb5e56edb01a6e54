use crate::error::{ChunkerError, Result};
use crate::types::TextChunk;

/// Fixed-size sliding-window splitter.
///
/// Sizes are measured in characters (Unicode scalar values), so a chunk never
/// cuts through a multi-byte code point. The final chunk may be shorter than
/// `chunk_size`; the walk stops once a window reaches the end of the corpus,
/// so no chunk is fully contained in its predecessor.
#[derive(Debug)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter, validating the window geometry.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ChunkerError::InvalidChunkSize(chunk_size));
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkerError::InvalidOverlap {
                chunk_size,
                chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split the corpus into overlapping chunks. An empty corpus yields no
    /// chunks.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end sentinel, so the
        // window walk can index by character and slice by byte.
        let mut bounds: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        bounds.push(text.len());
        let total_chars = bounds.len() - 1;

        let mut chunks = Vec::with_capacity(total_chars.div_ceil(self.stride()));
        let mut start = 0usize;
        let mut position = 0usize;
        loop {
            let end = usize::min(start + self.chunk_size, total_chars);
            let content = text[bounds[start]..bounds[end]].to_string();
            chunks.push(TextChunk::new(content, position));
            position += 1;

            if end == total_chars {
                break;
            }
            start = end - self.chunk_overlap;
        }

        chunks
    }

    const fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GUIDE: &str =
        "The capital of France is Paris. Python is a programming language.";

    fn splitter(size: usize, overlap: usize) -> TextSplitter {
        TextSplitter::new(size, overlap).expect("valid splitter config")
    }

    /// Rebuild the corpus from the first chunk plus each later chunk minus
    /// its leading overlap characters.
    fn reconstruct(chunks: &[TextChunk], overlap: usize) -> String {
        let mut out = String::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            if idx == 0 {
                out.push_str(&chunk.content);
            } else {
                out.extend(chunk.content.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn splits_with_expected_windows() {
        let chunks = splitter(10, 5).split("abcdefghijklmnopqrst");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "abcdefghij");
        assert_eq!(chunks[1].content, "fghijklmno");
        assert_eq!(chunks[2].content, "klmnopqrst");
        assert_eq!(
            chunks.iter().map(|c| c.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn each_window_starts_overlap_chars_before_previous_end() {
        let overlap = 7;
        let chunks = splitter(25, overlap).split(&"expect the unexpected ".repeat(12));

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let tail: String = prev[prev.len() - overlap..].iter().collect();
            let head: String = pair[1].content.chars().take(overlap).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn corpus_shorter_than_window_is_one_chunk() {
        let chunks = splitter(400, 80).split("short answer");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short answer");
        assert_eq!(chunks[0].position, 0);
    }

    #[test]
    fn empty_corpus_yields_no_chunks() {
        assert!(splitter(10, 2).split("").is_empty());
    }

    #[test]
    fn rejects_zero_chunk_size() {
        assert_eq!(
            TextSplitter::new(0, 0).unwrap_err(),
            ChunkerError::InvalidChunkSize(0)
        );
    }

    #[test]
    fn rejects_overlap_at_or_above_chunk_size() {
        assert!(matches!(
            TextSplitter::new(10, 10),
            Err(ChunkerError::InvalidOverlap { .. })
        ));
        assert!(matches!(
            TextSplitter::new(10, 15),
            Err(ChunkerError::InvalidOverlap { .. })
        ));
    }

    #[test]
    fn never_splits_multibyte_characters() {
        let corpus = "Grüße aus München: Schrödinger fragt nach Domänenwissen über λ-Kalkül und 機械学習.";
        let chunks = splitter(12, 4).split(corpus);

        for chunk in &chunks {
            assert!(chunk.char_len() <= 12);
        }
        assert_eq!(reconstruct(&chunks, 4), corpus);
    }

    #[test]
    fn reconstruction_holds_across_geometries() {
        let corpora = [
            GUIDE.to_string(),
            "one".to_string(),
            "behavioral questions need the STAR method ".repeat(40),
            "数据结构与算法是面试的重点。".repeat(17),
        ];
        let geometries = [(40, 10), (8, 1), (13, 12), (100, 0)];

        for corpus in &corpora {
            for &(size, overlap) in &geometries {
                let chunks = splitter(size, overlap).split(corpus);
                assert_eq!(
                    &reconstruct(&chunks, overlap),
                    corpus,
                    "size={size} overlap={overlap}"
                );
            }
        }
    }

    #[test]
    fn interview_guide_corpus_produces_overlapping_chunks() {
        let chunks = splitter(40, 10).split(GUIDE);

        assert!(chunks.len() >= 2, "expected at least 2 chunks");
        assert!(chunks[0].content.contains("capital of France"));
        assert!(chunks
            .last()
            .unwrap()
            .content
            .contains("Python is a programming language"));
    }
}
