use crate::config::CoachConfig;
use crate::error::{ChatError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
const MAX_RESULTS: usize = 5;

/// Anything that can answer a free-text query with formatted web results.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// Tavily web-search client.
pub struct TavilyClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    #[serde(default = "untitled")]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

fn untitled() -> String {
    "Untitled".to_string()
}

impl TavilyClient {
    pub fn new(config: &CoachConfig) -> Result<Self> {
        let api_key = config
            .tavily_api_key
            .clone()
            .ok_or(ChatError::ApiKeyMissing("TAVILY_API_KEY"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: TAVILY_ENDPOINT.to_string(),
        })
    }
}

/// Stand-in used when no Tavily key is configured: chat keeps working and
/// only explicit `search:` turns fail.
pub struct DisabledSearch;

#[async_trait]
impl SearchProvider for DisabledSearch {
    async fn search(&self, _query: &str) -> Result<String> {
        Err(ChatError::ApiKeyMissing("TAVILY_API_KEY"))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<String> {
        log::debug!("Searching the web for {query:?}");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchRequest {
                api_key: &self.api_key,
                query,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Search(format!(
                "Tavily API error {status}: {text}"
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        if let Some(error) = parsed.error {
            return Err(ChatError::Search(error));
        }
        Ok(format_results(&parsed.results))
    }
}

/// Render the top results as markdown sections: title, snippet, link.
fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    results
        .iter()
        .take(MAX_RESULTS)
        .map(|result| {
            let mut section = format!("### {}", result.title);
            if !result.content.is_empty() {
                section.push('\n');
                section.push_str(&result.content);
            }
            if !result.url.is_empty() {
                section.push('\n');
                section.push('<');
                section.push_str(&result.url);
                section.push('>');
            }
            section
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(title: &str, url: &str, content: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn empty_results_say_so() {
        assert_eq!(format_results(&[]), "No results found.");
    }

    #[test]
    fn results_render_as_markdown_sections() {
        let formatted = format_results(&[result(
            "Rust interviews",
            "https://example.com/rust",
            "Common borrow-checker questions.",
        )]);
        assert_eq!(
            formatted,
            "### Rust interviews\nCommon borrow-checker questions.\n<https://example.com/rust>"
        );
    }

    #[test]
    fn output_is_capped_at_five_results() {
        let results: Vec<SearchResult> = (0..8)
            .map(|i| result(&format!("Result {i}"), "", ""))
            .collect();
        let formatted = format_results(&results);
        assert_eq!(formatted.matches("### ").count(), MAX_RESULTS);
    }

    #[tokio::test]
    async fn disabled_search_reports_the_missing_key() {
        let err = DisabledSearch.search("anything").await.unwrap_err();
        assert!(matches!(err, ChatError::ApiKeyMissing("TAVILY_API_KEY")));
    }

    #[test]
    fn response_error_field_and_missing_fields_parse() {
        let with_error: SearchResponse =
            serde_json::from_str(r#"{"error": "rate limited"}"#).unwrap();
        assert_eq!(with_error.error.as_deref(), Some("rate limited"));
        assert!(with_error.results.is_empty());

        let sparse: SearchResponse =
            serde_json::from_str(r#"{"results": [{"url": "https://a.example"}]}"#).unwrap();
        assert_eq!(sparse.results[0].title, "Untitled");
        assert_eq!(sparse.results[0].url, "https://a.example");
    }
}
