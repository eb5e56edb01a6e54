//! # Coach Chat
//!
//! Conversation orchestration for the interview coach: provider clients,
//! routing, and prompt assembly over retrieved context.
//!
//! ## Architecture
//!
//! ```text
//! respond(query, history, mode)
//!         │
//!         ├── "search:" keyword ──▶ SearchProvider (Tavily) ──▶ markdown
//!         │
//!         └── otherwise
//!               ├── Retriever::retrieve_context(query, 3)
//!               ├── system prompt (coach persona + mode + context)
//!               └── ChatProvider (Groq) ──▶ assistant reply
//! ```
//!
//! Providers sit behind [`ChatProvider`] and [`SearchProvider`] traits, so
//! the orchestrator is tested with in-process fakes and wired to real
//! clients only in the binary.

mod config;
mod error;
mod llm;
mod orchestrator;
mod types;
mod web_search;

pub use config::{CoachConfig, DEFAULT_CHAT_MODEL, DEFAULT_LLM_BASE_URL};
pub use error::{ChatError, Result};
pub use llm::{ChatProvider, GroqClient};
pub use orchestrator::Orchestrator;
pub use types::{Message, ResponseMode, Role};
pub use web_search::{DisabledSearch, SearchProvider, TavilyClient};
