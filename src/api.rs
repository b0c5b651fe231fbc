// Boundary Surface
// Check and fix operations the host (CLI today, HTTP layer elsewhere) calls into.
// Every operation returns a result object or a structured `{ "error": ... }`.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::models::{CheckRequest, CheckResult, FixRequest, RewriteResult};
use crate::services::config_store::AppConfig;
use crate::services::detection::{check_originality, OriginalityProber};
use crate::services::document::extract_document_text;
use crate::services::providers::{preview, GoogleSearchClient, RewriteProvider, WatsonxClient};
use crate::services::rewrite::{HybridRewriter, RewriteEngine};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    EmptyText(&'static str),
    #[error("{0}")]
    UnreadableDocument(String),
}

impl ApiError {
    /// HTTP-style status for hosts that need one
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::EmptyText(_) | ApiError::UnreadableDocument(_) => 400,
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiError", 1)?;
        state.serialize_field("error", &self.to_string())?;
        state.end()
    }
}

fn require_text(text: &str, message: &'static str) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::EmptyText(message));
    }
    Ok(())
}

/// Everything a check or fix request needs, built once per process.
pub struct OriginCheck {
    prober: OriginalityProber,
    rewriter: HybridRewriter,
}

impl OriginCheck {
    pub fn new(prober: OriginalityProber, rewriter: HybridRewriter) -> Self {
        Self { prober, rewriter }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let search = Arc::new(GoogleSearchClient::from_config(config));
        let prober = OriginalityProber::new(search, &config.search);

        let primary: Arc<dyn RewriteProvider> = Arc::new(WatsonxClient::from_config(config));
        let engine = Arc::new(RewriteEngine::new(config.rewrite.clone()));
        let rewriter = HybridRewriter::new(
            Some(primary),
            engine,
            config.watsonx.timeout(),
        );

        Self::new(prober, rewriter)
    }

    pub async fn check_text(&self, request: CheckRequest) -> Result<CheckResult, ApiError> {
        require_text(&request.text, "No text provided")?;

        let request_id = Uuid::new_v4();
        let span = info_span!("check", request_id = %request_id);
        async {
            info!("[API] check request: {} chars", request.text.chars().count());
            Ok(check_originality(&self.prober, &request.text).await)
        }
        .instrument(span)
        .await
    }

    pub async fn fix_text(&self, request: FixRequest) -> Result<RewriteResult, ApiError> {
        require_text(&request.text, "No text provided to fix.")?;

        let request_id = Uuid::new_v4();
        let span = info_span!("fix", request_id = %request_id);
        async {
            info!("[API] fix request: {}", preview(&request.text, 60));
            Ok(self.rewriter.fix(&request.text).await)
        }
        .instrument(span)
        .await
    }

    /// Extract a document's text, then run the check on it.
    pub async fn check_document(&self, file_name: &str, bytes: &[u8]) -> Result<CheckResult, ApiError> {
        let text = extract_document_text(file_name, bytes).map_err(ApiError::UnreadableDocument)?;
        self.check_text(CheckRequest { text }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RewriteSource, ScoreBand};
    use crate::services::config_store::SearchConfig;
    use crate::services::providers::{ProviderError, SearchItem, SearchOutcome, SearchProvider};
    use crate::services::rewrite::{FallbackRewriter, RewriteError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct EverythingMatches {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchProvider for EverythingMatches {
        async fn search(&self, _query: &str) -> SearchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SearchOutcome::Items(vec![SearchItem {
                title: Some("Copy".to_string()),
                link: Some("https://example.org".to_string()),
                snippet: Some("same words".to_string()),
            }])
        }
    }

    struct Unavailable;

    #[async_trait]
    impl RewriteProvider for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        async fn rephrase(&self, _text: &str) -> Result<String, ProviderError> {
            Err(ProviderError::MissingCredentials("test service"))
        }
    }

    struct BrokenEngine;

    impl FallbackRewriter for BrokenEngine {
        fn rewrite_text(&self, _text: &str) -> Result<String, RewriteError> {
            Err(RewriteError::EmptyOutput)
        }
    }

    fn service(calls: Arc<AtomicUsize>) -> OriginCheck {
        let prober = OriginalityProber::new(Arc::new(EverythingMatches { calls }), &SearchConfig::default());
        let rewriter = HybridRewriter::new(
            Some(Arc::new(Unavailable)),
            Arc::new(BrokenEngine),
            Duration::from_secs(1),
        );
        OriginCheck::new(prober, rewriter)
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_any_lookup() {
        let calls = Arc::new(AtomicUsize::new(0));
        let api = service(Arc::clone(&calls));

        let err = api.check_text(CheckRequest { text: "   ".to_string() }).await.unwrap_err();
        assert_eq!(err, ApiError::EmptyText("No text provided"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let err = api.fix_text(FixRequest { text: String::new() }).await.unwrap_err();
        assert_eq!(serde_json::to_value(&err).unwrap(), serde_json::json!({"error": "No text provided to fix."}));
    }

    #[tokio::test]
    async fn test_check_text_end_to_end() {
        let calls = Arc::new(AtomicUsize::new(0));
        let api = service(Arc::clone(&calls));

        let result = api
            .check_text(CheckRequest {
                text: "The sky is blue. Cats are mammals. Hi there.".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result.total_sentences, 3);
        assert_eq!(result.matched_sentences, 2);
        assert_eq!(result.score, 67);
        assert_eq!(result.band, ScoreBand::Moderate);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fix_text_never_fails_once_validated() {
        let api = service(Arc::new(AtomicUsize::new(0)));
        let result = api
            .fix_text(FixRequest {
                text: "Cats are mammals.".to_string(),
            })
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.source, RewriteSource::FallbackStatic);
        assert!(result.fixed_text.contains("Cats are mammals."));
    }

    #[tokio::test]
    async fn test_check_document_plain_text() {
        let calls = Arc::new(AtomicUsize::new(0));
        let api = service(Arc::clone(&calls));

        let result = api.check_document("essay.txt", b"Water boils at 100 degrees.\n").await.unwrap();
        assert_eq!(result.score, 100);

        let err = api.check_document("empty.txt", b"\n\n").await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
