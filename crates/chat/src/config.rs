use coach_retriever::RetrieverConfig;
use coach_vector_store::DEFAULT_MODEL_ID;
use std::path::PathBuf;
use std::time::Duration;

/// Groq's fast Llama tier; good enough for coaching answers.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";

/// Groq exposes an OpenAI-compatible surface under this base.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";

const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Runtime configuration, resolved once from the environment. `.env` loading
/// is the binary's job; this only reads what is already set. API keys stay
/// optional until the feature that needs them is used.
#[derive(Clone, Debug)]
pub struct CoachConfig {
    pub groq_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub chat_model: String,
    pub llm_base_url: String,
    pub corpus_path: PathBuf,
    pub index_dir: PathBuf,
    pub embedding_model: String,
    pub index_ttl: Duration,
}

impl CoachConfig {
    pub fn from_env() -> Self {
        Self {
            groq_api_key: env_non_empty("GROQ_API_KEY"),
            tavily_api_key: env_non_empty("TAVILY_API_KEY"),
            chat_model: env_or("COACH_MODEL", DEFAULT_CHAT_MODEL),
            llm_base_url: env_or("COACH_LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            corpus_path: env_or("COACH_CORPUS", "data/interview_guide.txt").into(),
            index_dir: env_or("COACH_INDEX_DIR", "data/index").into(),
            embedding_model: env_or("COACH_EMBEDDING_MODEL", DEFAULT_MODEL_ID),
            index_ttl: env_ttl("COACH_INDEX_TTL_SECS"),
        }
    }

    /// Retrieval settings derived from this configuration.
    #[must_use]
    pub fn retriever_config(&self) -> RetrieverConfig {
        let mut config = RetrieverConfig::new(&self.corpus_path, &self.index_dir);
        config.index_ttl = self.index_ttl;
        config
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_ttl(key: &str) -> Duration {
    let secs = match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {key}={raw:?}, using default TTL");
            DEFAULT_TTL_SECS
        }),
        Err(_) => DEFAULT_TTL_SECS,
    };
    Duration::from_secs(secs)
}
