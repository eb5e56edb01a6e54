//! # Coach Vector Store
//!
//! Embeddings and semantic search over a chunked corpus.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               IndexStore                │
//! │  build / save / load / exists / search  │
//! └────────┬───────────────────┬────────────┘
//!          │                   │
//!          ▼                   ▼
//! ┌────────────────┐  ┌────────────────────┐
//! │    Embedder    │  │    SearchIndex     │
//! │ fastembed or   │  │ chunks + vectors,  │
//! │ hashed backend │  │ cosine distance    │
//! └────────────────┘  └────────────────────┘
//! ```
//!
//! The embedder is injected once and shared; the same model embeds both
//! corpus chunks and queries, so distances are always comparable. Indexes
//! persist as a versioned JSON payload in a directory and round-trip
//! exactly: a reloaded index returns the same results as the one it was
//! saved from.
//!
//! ## Example
//!
//! ```no_run
//! use coach_vector_store::{Embedder, EmbedderConfig, IndexStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> coach_vector_store::Result<()> {
//! let embedder = Arc::new(Embedder::load(&EmbedderConfig::default())?);
//! let store = IndexStore::new(embedder);
//!
//! let index = store.build("corpus text here", 400, 80).await?;
//! store.save(&index, "data/index".as_ref()).await?;
//!
//! let hits = store.search(&index, "what is rust", 3).await?;
//! for hit in hits {
//!     println!("{:.3}  {}", hit.distance, hit.chunk.content);
//! }
//! # Ok(())
//! # }
//! ```

mod embeddings;
mod error;
mod index;
mod store;
mod types;

pub use embeddings::{Embedder, EmbedderConfig, DEFAULT_MODEL_ID, HASHED_MODEL_ID};
pub use error::{Result, VectorStoreError};
pub use index::{cosine_distance, VectorIndex};
pub use store::{sha256_hex, IndexStore, SearchIndex, INDEX_SCHEMA_VERSION};
pub use types::ScoredChunk;

pub use coach_text_chunker::{TextChunk, TextSplitter};
