use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for vector store operations
pub type Result<T> = std::result::Result<T, VectorStoreError>;

/// Errors that can occur while embedding, indexing, or persisting
#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// The embedding model could not be initialized
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// A backend call failed while producing vectors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector length does not match the index dimension
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    /// No index directory at the given path
    #[error("Index missing at {0}")]
    IndexMissing(PathBuf),

    /// The index directory exists but its payload is unusable
    #[error("Index corrupt at {path}: {reason}")]
    IndexCorrupt { path: PathBuf, reason: String },

    /// Query-time failure
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid splitter geometry
    #[error("Chunker error: {0}")]
    Chunker(#[from] coach_text_chunker::ChunkerError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error occurred
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VectorStoreError {
    /// Create an index-corrupt error for the given directory
    pub fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        Self::IndexCorrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
