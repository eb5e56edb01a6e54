//! # Coach Text Chunker
//!
//! Sliding-window splitting of a plain-text study corpus into overlapping
//! chunks sized for sentence embedding.
//!
//! ## Architecture
//!
//! ```text
//! Corpus (UTF-8 text)
//!     │
//!     ├──> Window walk (char-based, never splits a code point)
//!     │      ├─> chunk_size characters per window
//!     │      └─> next window starts chunk_overlap before previous end
//!     │
//!     └──> TextChunk[] with sequence positions
//! ```
//!
//! ## Example
//!
//! ```rust
//! use coach_text_chunker::TextSplitter;
//!
//! let splitter = TextSplitter::new(400, 80).unwrap();
//! let chunks = splitter.split("Tell me about yourself. Walk me through your resume.");
//! for chunk in &chunks {
//!     println!("chunk {}: {} chars", chunk.position, chunk.content.chars().count());
//! }
//! ```

mod error;
mod splitter;
mod types;

pub use error::{ChunkerError, Result};
pub use splitter::TextSplitter;
pub use types::TextChunk;
