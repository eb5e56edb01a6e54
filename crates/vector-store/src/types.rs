use coach_text_chunker::TextChunk;

/// A chunk scored against a query. Smaller distance means more relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub distance: f32,
}
