use serde::{Deserialize, Serialize};

/// A contiguous slice of the corpus produced by the sliding window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Raw chunk text
    pub content: String,

    /// Zero-based position in the split sequence
    pub position: usize,
}

impl TextChunk {
    #[must_use]
    pub fn new(content: String, position: usize) -> Self {
        Self { content, position }
    }

    /// Length in characters (Unicode scalar values), not bytes
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
