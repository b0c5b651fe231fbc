// Check Pipeline
// raw text -> segmenter -> concurrent prober -> score aggregation

use std::time::Instant;
use tracing::info;

use crate::models::CheckResult;
use crate::services::sentence_segmenter::segment_sentences;

use super::aggregation::aggregate_verdicts;
use super::prober::OriginalityProber;

pub async fn check_originality(prober: &OriginalityProber, text: &str) -> CheckResult {
    let started = Instant::now();
    let sentences = segment_sentences(text);
    info!("[CHECK] checking {} sentences", sentences.len());

    let verdicts = prober.probe_all(&sentences).await;
    let result = aggregate_verdicts(verdicts, sentences.len());

    info!(
        "[CHECK] score={}% ({}/{} sentences) band={:?} elapsed_ms={}",
        result.score,
        result.matched_sentences,
        result.total_sentences,
        result.band,
        started.elapsed().as_millis()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::config_store::SearchConfig;
    use crate::services::providers::{SearchItem, SearchOutcome, SearchProvider};
    use async_trait::async_trait;
    use std::sync::Arc;

    const INPUT: &str = "The sky is blue. Cats are mammals. Water boils at 100 degrees.";

    struct NoMatches;

    #[async_trait]
    impl SearchProvider for NoMatches {
        async fn search(&self, _query: &str) -> SearchOutcome {
            SearchOutcome::Items(Vec::new())
        }
    }

    struct MatchesCats;

    #[async_trait]
    impl SearchProvider for MatchesCats {
        async fn search(&self, query: &str) -> SearchOutcome {
            if query == "\"Cats are mammals.\"" {
                SearchOutcome::Items(vec![SearchItem {
                    title: Some("Mammals".to_string()),
                    link: Some("https://example.org/mammals".to_string()),
                    snippet: None,
                }])
            } else {
                SearchOutcome::Items(Vec::new())
            }
        }
    }

    #[tokio::test]
    async fn test_no_matches_scores_zero() {
        let prober = OriginalityProber::new(Arc::new(NoMatches), &SearchConfig::default());
        let result = check_originality(&prober, INPUT).await;

        assert_eq!(result.score, 0);
        assert_eq!(result.total_sentences, 3);
        assert_eq!(result.results.len(), 3);
        assert!(result.results.iter().all(|v| !v.matched && v.evidence.is_empty()));
    }

    #[tokio::test]
    async fn test_one_match_scores_thirty_three() {
        let prober = OriginalityProber::new(Arc::new(MatchesCats), &SearchConfig::default());
        let result = check_originality(&prober, INPUT).await;

        assert_eq!(result.score, 33);
        assert_eq!(result.total_sentences, 3);
        assert!(!result.results[0].matched);
        assert!(result.results[1].matched);
        assert_eq!(result.results[1].evidence.len(), 1);
        assert_eq!(result.results[1].evidence[0].snippet, "No snippet available");
        assert!(!result.results[2].matched);
    }

    #[tokio::test]
    async fn test_empty_text_has_no_sentences() {
        let prober = OriginalityProber::new(Arc::new(NoMatches), &SearchConfig::default());
        let result = check_originality(&prober, "  \n ").await;
        assert_eq!(result.score, 0);
        assert_eq!(result.total_sentences, 0);
    }
}
