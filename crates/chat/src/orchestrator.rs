use crate::error::Result;
use crate::llm::ChatProvider;
use crate::types::{Message, ResponseMode};
use crate::web_search::SearchProvider;
use coach_retriever::{Retriever, DEFAULT_TOP_K};
use std::sync::Arc;

/// Queries containing this keyword bypass the coach and go to web search.
const SEARCH_KEYWORD: &str = "search:";

/// Routes each user turn: explicit web searches go to the search provider,
/// everything else gets knowledge-base context and an LLM answer.
pub struct Orchestrator {
    chat: Arc<dyn ChatProvider>,
    search: Arc<dyn SearchProvider>,
    retriever: Arc<Retriever>,
}

impl Orchestrator {
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        search: Arc<dyn SearchProvider>,
        retriever: Arc<Retriever>,
    ) -> Self {
        Self {
            chat,
            search,
            retriever,
        }
    }

    /// Answer one user turn. `history` holds the prior user/assistant
    /// messages in order; the current `query` is appended after them.
    pub async fn respond(
        &self,
        query: &str,
        history: &[Message],
        mode: ResponseMode,
    ) -> Result<String> {
        if let Some(term) = search_term(query) {
            log::info!("Routing turn to web search: {term:?}");
            let results = self.search.search(term).await?;
            return Ok(format!("Web search results for `{term}`:\n\n{results}"));
        }

        let context = self.retriever.retrieve_context(query, DEFAULT_TOP_K).await;
        let messages = assemble_messages(query, history, &context, mode);
        self.chat.complete(&messages).await
    }
}

/// The text after the first `search:` keyword, matched case-insensitively.
fn search_term(query: &str) -> Option<&str> {
    let at = query.to_ascii_lowercase().find(SEARCH_KEYWORD)?;
    Some(query[at + SEARCH_KEYWORD.len()..].trim())
}

fn assemble_messages(
    query: &str,
    history: &[Message],
    context: &str,
    mode: ResponseMode,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system_prompt(context, mode)));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(query));
    messages
}

fn system_prompt(context: &str, mode: ResponseMode) -> String {
    if context.is_empty() {
        format!(
            "You are an AI Interview Coach.\n\n\
             Response Mode: {}\n\n\
             No knowledge-base context was retrieved for this question.",
            mode.instruction()
        )
    } else {
        format!(
            "You are an AI Interview Coach.\n\n\
             Response Mode: {}\n\n\
             If relevant, use the following retrieved context from the knowledge base:\n{}",
            mode.instruction(),
            context
        )
    }
}
