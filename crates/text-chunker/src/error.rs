use thiserror::Error;

/// Result type for splitter operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while configuring a splitter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkerError {
    /// Chunk size of zero would make the window walk impossible
    #[error("Invalid chunk size {0} (must be at least 1)")]
    InvalidChunkSize(usize),

    /// Overlap must stay below the chunk size so each window advances
    #[error("Invalid chunk overlap {chunk_overlap} (must be smaller than chunk size {chunk_size})")]
    InvalidOverlap {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}
