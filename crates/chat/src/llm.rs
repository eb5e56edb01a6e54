use crate::config::CoachConfig;
use crate::error::{ChatError, Result};
use crate::types::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const TEMPERATURE: f32 = 0.2;
const MAX_TOKENS: u32 = 1024;

/// Anything that can turn a message list into an assistant reply.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Chat-completion client for Groq's OpenAI-compatible API.
#[derive(Debug)]
pub struct GroqClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantReply,
}

#[derive(Deserialize)]
struct AssistantReply {
    content: String,
}

impl GroqClient {
    /// Fails fast when `GROQ_API_KEY` is absent rather than at the first
    /// request.
    pub fn new(config: &CoachConfig) -> Result<Self> {
        let api_key = config
            .groq_api_key
            .clone()
            .ok_or(ChatError::ApiKeyMissing("GROQ_API_KEY"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            model: config.chat_model.clone(),
        })
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        log::debug!("Requesting completion from {} ({})", url, self.model);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider(format!(
                "Groq API error {status}: {text}"
            )));
        }

        let completion: CompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Provider("No choices in response".to_string()))?;
        Ok(choice.message.content)
    }
}
