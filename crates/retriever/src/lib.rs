//! # Coach Retriever
//!
//! Lazy, cached context retrieval for the interview coach chat loop.
//!
//! ## Architecture
//!
//! ```text
//! retrieve_context(query, k)
//!         │
//!         ▼
//! ┌──────────────────┐   miss / expired   ┌─────────────────────────┐
//! │    IndexCache    │ ─────────────────▶ │ load persisted index,   │
//! │ per-dir slots,   │                    │ or build from corpus    │
//! │ 24h TTL          │ ◀───────────────── │ and save it             │
//! └──────────────────┘    cache result    └─────────────────────────┘
//!         │
//!         ▼
//!   cosine search, top-k chunks joined into one string
//! ```
//!
//! Concurrent queries hitting a cold cache coalesce into a single build per
//! index directory. Every failure mode downstream of
//! [`Retriever::retrieve_context`] is logged and collapsed into an empty
//! string, so a broken index or missing corpus degrades the answer instead
//! of the conversation.
//!
//! ## Example
//!
//! ```no_run
//! use coach_retriever::{Retriever, RetrieverConfig, DEFAULT_TOP_K};
//! use coach_vector_store::{Embedder, EmbedderConfig, IndexStore};
//! use std::sync::Arc;
//!
//! # async fn demo() -> coach_retriever::Result<()> {
//! let embedder = Arc::new(Embedder::load(&EmbedderConfig::default())?);
//! let store = IndexStore::new(embedder);
//! let retriever = Retriever::new(store, RetrieverConfig::default());
//!
//! let context = retriever
//!     .retrieve_context("how should I answer behavioral questions", DEFAULT_TOP_K)
//!     .await;
//! println!("{context}");
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
mod retriever;

pub use cache::IndexCache;
pub use error::{Result, RetrieverError};
pub use retriever::{Retriever, RetrieverConfig, DEFAULT_INDEX_TTL, DEFAULT_TOP_K};
