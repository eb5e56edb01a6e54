use thiserror::Error;

/// Errors from the chat orchestration layer and its providers.
#[derive(Error, Debug)]
pub enum ChatError {
    /// A provider was constructed without its required API key.
    #[error("{0} is not set. Add it to your environment or .env file")]
    ApiKeyMissing(&'static str),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The LLM provider answered with an error or an unusable response.
    #[error("Chat provider error: {0}")]
    Provider(String),

    /// The web-search provider answered with an error.
    #[error("Web search error: {0}")]
    Search(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
