use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while acquiring or querying the cached index.
///
/// These stay internal to the retrieval flow: the public
/// [`retrieve_context`](crate::Retriever::retrieve_context) entry point
/// logs them and degrades to an empty context string.
#[derive(Error, Debug)]
pub enum RetrieverError {
    /// The corpus file needed to build a fresh index does not exist.
    #[error("Corpus file not found: {0}")]
    CorpusNotFound(PathBuf),

    /// Reading the corpus failed for a reason other than absence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding, index build, persistence, or search failed downstream.
    #[error(transparent)]
    Store(#[from] coach_vector_store::VectorStoreError),
}

pub type Result<T> = std::result::Result<T, RetrieverError>;
