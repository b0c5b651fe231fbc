// External Provider Service
// Implements the verbatim-match search lookup and the generative rewrite call

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::config_store::{get_credential, AppConfig, Credential, SearchConfig, WatsonxConfig};

const HTTP_TIMEOUT_SECS: u64 = 30;

const REPHRASE_INSTRUCTION: &str =
    "Rephrase this text to make it original while keeping the same meaning:";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("{0} not configured")]
    MissingCredentials(&'static str),
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl ProviderError {
    /// Configuration problems fail immediately and are never worth retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::MissingCredentials(_))
    }
}

fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

// ============ Search capability ============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// Result of one lookup. Failures arrive as an error marker, never as a panic.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Items(Vec<SearchItem>),
    Error(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> SearchOutcome;
}

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
}

pub struct GoogleSearchClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    cx: Option<String>,
    page_size: u8,
}

impl GoogleSearchClient {
    pub fn new(settings: &SearchConfig, api_key: Option<String>, cx: Option<String>) -> Self {
        Self {
            client: build_http_client(),
            base_url: settings.endpoint(),
            api_key,
            cx,
            page_size: settings.page_size,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.search,
            get_credential(Credential::GoogleApiKey, config),
            get_credential(Credential::GoogleCx, config),
        )
    }

    async fn call_search_api(&self, query: &str) -> Result<Vec<SearchItem>, ProviderError> {
        let (api_key, cx) = match (self.api_key.as_deref(), self.cx.as_deref()) {
            (Some(k), Some(c)) => (k, c),
            _ => return Err(ProviderError::MissingCredentials("Google API key or CX")),
        };

        let page_size = self.page_size.clamp(1, 10).to_string();
        let start = Instant::now();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", api_key), ("cx", cx), ("q", query), ("num", page_size.as_str())])
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: CustomSearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let items = data.items.unwrap_or_default();
        debug!(latency_ms, items = items.len(), "[SEARCH] lookup done");
        Ok(items)
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str) -> SearchOutcome {
        match self.call_search_api(query).await {
            Ok(items) => SearchOutcome::Items(items),
            Err(e @ ProviderError::MissingCredentials(_)) => {
                warn!("[SEARCH] {} for query: {}", e, preview(query, 50));
                SearchOutcome::Error(e.to_string())
            }
            Err(e) => {
                warn!("[SEARCH] lookup failed: {}", e);
                SearchOutcome::Error("Search service temporarily unavailable".to_string())
            }
        }
    }
}

// ============ Generative rewrite capability ============

#[async_trait]
pub trait RewriteProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Rephrase `text`. An empty or absent generation is an error.
    async fn rephrase(&self, text: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct WatsonxCredentials {
    pub api_key: String,
    pub project_id: String,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    decoding_method: String,
    max_new_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct GenerationRequest {
    input: String,
    model_id: String,
    project_id: String,
    parameters: GenerationParameters,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    results: Option<Vec<GenerationResult>>,
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

pub struct WatsonxClient {
    client: Client,
    settings: WatsonxConfig,
    credentials: Option<WatsonxCredentials>,
}

impl WatsonxClient {
    pub fn new(settings: WatsonxConfig, credentials: Option<WatsonxCredentials>) -> Self {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .unwrap_or_default();

        Self {
            client,
            settings,
            credentials,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let credentials = match (
            get_credential(Credential::WatsonxApiKey, config),
            get_credential(Credential::WatsonxProjectId, config),
        ) {
            (Some(api_key), Some(project_id)) => Some(WatsonxCredentials { api_key, project_id }),
            _ => None,
        };
        Self::new(config.watsonx.clone(), credentials)
    }

    /// Exchange the API key for a short-lived bearer token
    async fn fetch_token(&self, api_key: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.settings.token_url())
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: format!("IBM authentication failed: {}", body),
            });
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        data.access_token
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingContent)
    }

    async fn call_generation_api(
        &self,
        credentials: &WatsonxCredentials,
        text: &str,
    ) -> Result<String, ProviderError> {
        let token = self.fetch_token(&credentials.api_key).await?;

        let url = format!(
            "{}/ml/v1/text/generation?version={}",
            self.settings.service_url().trim_end_matches('/'),
            self.settings.api_version
        );

        let request = GenerationRequest {
            input: rephrase_prompt(text),
            model_id: self.settings.model_id.clone(),
            project_id: credentials.project_id.clone(),
            parameters: GenerationParameters {
                decoding_method: self.settings.decoding_method.clone(),
                max_new_tokens: self.settings.max_new_tokens,
                temperature: self.settings.temperature,
            },
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: GenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let generated = data
            .results
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.generated_text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingContent)?;

        info!(
            model = %self.settings.model_id,
            latency_ms,
            chars = generated.chars().count(),
            "[WATSONX] generation ok"
        );
        Ok(generated)
    }
}

#[async_trait]
impl RewriteProvider for WatsonxClient {
    fn name(&self) -> &str {
        "watsonx"
    }

    async fn rephrase(&self, text: &str) -> Result<String, ProviderError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::MissingCredentials("Watsonx API key or project id"))?;
        self.call_generation_api(credentials, text).await
    }
}

/// Instruction sent to the generative service
pub fn rephrase_prompt(text: &str) -> String {
    format!("{} \"{}\"", REPHRASE_INSTRUCTION, text)
}

/// First `max_chars` characters, for log lines
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rephrase_prompt_embeds_text() {
        let prompt = rephrase_prompt("Cats are mammals.");
        assert_eq!(
            prompt,
            "Rephrase this text to make it original while keeping the same meaning: \"Cats are mammals.\""
        );
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn test_custom_search_response_parsing() {
        let body = r#"{"items":[{"title":"A","link":"https://a"},{"snippet":"only snippet"}]}"#;
        let parsed: CustomSearchResponse = serde_json::from_str(body).unwrap();
        let items = parsed.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].snippet, None);
        assert_eq!(items[1].title, None);

        let empty: CustomSearchResponse = serde_json::from_str(r#"{"kind":"x"}"#).unwrap();
        assert!(empty.items.is_none());
    }

    #[test]
    fn test_generation_response_parsing() {
        let body = r#"{"results":[{"generated_text":"  New wording.  "}]}"#;
        let parsed: GenerationResponse = serde_json::from_str(body).unwrap();
        let text = parsed.results.unwrap().remove(0).generated_text.unwrap();
        assert_eq!(text.trim(), "New wording.");
    }

    #[tokio::test]
    async fn test_search_without_credentials_is_error_marker() {
        let client = GoogleSearchClient::new(&SearchConfig::default(), None, Some("cx".to_string()));
        match client.search("\"The sky is blue.\"").await {
            SearchOutcome::Error(msg) => assert!(msg.contains("not configured")),
            SearchOutcome::Items(_) => panic!("expected error marker"),
        }
    }

    #[tokio::test]
    async fn test_watsonx_without_credentials_fails_fast() {
        let client = WatsonxClient::new(WatsonxConfig::default(), None);
        let err = client.rephrase("Cats are mammals.").await.unwrap_err();
        assert!(err.is_configuration());
    }
}
