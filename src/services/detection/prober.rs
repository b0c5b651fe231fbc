// Originality Prober
// One exact-phrase lookup per qualifying sentence, all in flight together.
// A failed lookup only degrades its own sentence to "unmatched".

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::models::{EvidenceSource, Sentence, SentenceVerdict};
use crate::services::config_store::SearchConfig;
use crate::services::providers::{preview, SearchItem, SearchOutcome, SearchProvider};

const UNKNOWN_TITLE: &str = "Unknown Source";
const UNKNOWN_LINK: &str = "#";
const UNKNOWN_SNIPPET: &str = "No snippet available";

pub struct OriginalityProber {
    search: Arc<dyn SearchProvider>,
    min_words: usize,
    max_evidence: usize,
    max_in_flight: usize,
}

impl OriginalityProber {
    pub fn new(search: Arc<dyn SearchProvider>, settings: &SearchConfig) -> Self {
        Self {
            search,
            min_words: settings.min_words,
            max_evidence: settings.max_evidence,
            max_in_flight: settings.max_in_flight,
        }
    }

    /// Whether a sentence is long enough to be worth a lookup
    pub fn qualifies(&self, sentence: &Sentence) -> bool {
        sentence.word_count >= self.min_words
    }

    /// Probe every sentence and return verdicts in document order.
    pub async fn probe_all(&self, sentences: &[Sentence]) -> Vec<SentenceVerdict> {
        let started = Instant::now();
        let mut slots: Vec<Option<SentenceVerdict>> = vec![None; sentences.len()];

        let permits = if self.max_in_flight == 0 {
            sentences.len().max(1)
        } else {
            self.max_in_flight
        };
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut join_set: JoinSet<(usize, SentenceVerdict)> = JoinSet::new();
        let mut lookups: usize = 0;

        for (idx, sentence) in sentences.iter().enumerate() {
            if !self.qualifies(sentence) {
                debug!("[PROBER] {}/{} skipped - too short", idx + 1, sentences.len());
                slots[idx] = Some(SentenceVerdict::unmatched(sentence.text.clone()));
                continue;
            }

            let search = Arc::clone(&self.search);
            let semaphore = Arc::clone(&semaphore);
            let text = sentence.text.clone();
            let max_evidence = self.max_evidence;
            lookups += 1;

            join_set.spawn(async move {
                let outcome = match semaphore.acquire().await {
                    Ok(_permit) => search.search(&exact_phrase_query(&text)).await,
                    Err(_) => SearchOutcome::Error("semaphore closed".to_string()),
                };
                (idx, classify(&text, outcome, max_evidence))
            });
        }

        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((idx, verdict)) => slots[idx] = Some(verdict),
                Err(e) => warn!("[PROBER] lookup task failed: {}", e),
            }
        }

        let verdicts: Vec<SentenceVerdict> = slots
            .into_iter()
            .zip(sentences)
            .map(|(slot, sentence)| {
                slot.unwrap_or_else(|| SentenceVerdict::unmatched(sentence.text.clone()))
            })
            .collect();

        info!(
            "[PROBER] probed sentences={} lookups={} matched={} elapsed_ms={}",
            sentences.len(),
            lookups,
            verdicts.iter().filter(|v| v.matched).count(),
            started.elapsed().as_millis()
        );
        verdicts
    }
}

/// The sentence wrapped in double quotes for an exact-phrase lookup
pub fn exact_phrase_query(sentence: &str) -> String {
    format!("\"{}\"", sentence)
}

/// Turn one lookup outcome into a verdict. Error markers never count as matches.
pub fn classify(sentence: &str, outcome: SearchOutcome, max_evidence: usize) -> SentenceVerdict {
    match outcome {
        SearchOutcome::Items(items) if !items.is_empty() => {
            let evidence: Vec<EvidenceSource> =
                items.into_iter().take(max_evidence).map(to_evidence).collect();
            debug!(
                "[PROBER] matched \"{}\" sources={}",
                preview(sentence, 60),
                evidence.len()
            );
            SentenceVerdict {
                sentence: sentence.to_string(),
                matched: true,
                evidence,
            }
        }
        SearchOutcome::Items(_) => SentenceVerdict::unmatched(sentence),
        SearchOutcome::Error(marker) => {
            debug!("[PROBER] no result for \"{}\": {}", preview(sentence, 60), marker);
            SentenceVerdict::unmatched(sentence)
        }
    }
}

fn to_evidence(item: SearchItem) -> EvidenceSource {
    fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| placeholder.to_string())
    }

    EvidenceSource {
        title: or_placeholder(item.title, UNKNOWN_TITLE),
        link: or_placeholder(item.link, UNKNOWN_LINK),
        snippet: or_placeholder(item.snippet, UNKNOWN_SNIPPET),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn item(title: &str) -> SearchItem {
        SearchItem {
            title: Some(title.to_string()),
            link: Some(format!("https://example.org/{}", title)),
            snippet: Some("snippet".to_string()),
        }
    }

    /// Returns `hits` items for every query and records what it was asked.
    struct CountingSearch {
        calls: AtomicUsize,
        hits: usize,
        queries: Mutex<Vec<String>>,
    }

    impl CountingSearch {
        fn new(hits: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                hits,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(&self, query: &str) -> SearchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            SearchOutcome::Items((0..self.hits).map(|i| item(&format!("t{}", i))).collect())
        }
    }

    struct PanickyOnCats;

    #[async_trait]
    impl SearchProvider for PanickyOnCats {
        async fn search(&self, query: &str) -> SearchOutcome {
            if query.contains("Cats") {
                panic!("lookup blew up");
            }
            if query.contains("sky") {
                return SearchOutcome::Error("Search service temporarily unavailable".to_string());
            }
            SearchOutcome::Items(vec![item("water")])
        }
    }

    fn prober(search: Arc<dyn SearchProvider>) -> OriginalityProber {
        OriginalityProber::new(search, &SearchConfig::default())
    }

    #[tokio::test]
    async fn test_short_sentences_skip_lookup() {
        let search = Arc::new(CountingSearch::new(1));
        let p = prober(search.clone());
        let sentences = vec![Sentence::new("Hi there."), Sentence::new("Yes."), Sentence::new("This is long enough.")];

        let verdicts = p.probe_all(&sentences).await;

        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert!(!verdicts[0].matched && verdicts[0].evidence.is_empty());
        assert!(!verdicts[1].matched && verdicts[1].evidence.is_empty());
        assert!(verdicts[2].matched);
        assert_eq!(
            search.queries.lock().unwrap().as_slice(),
            &["\"This is long enough.\"".to_string()]
        );
    }

    #[tokio::test]
    async fn test_evidence_capped_at_two() {
        let search = Arc::new(CountingSearch::new(7));
        let verdicts = prober(search).probe_all(&[Sentence::new("Cats are mammals indeed.")]).await;
        assert!(verdicts[0].matched);
        assert_eq!(verdicts[0].evidence.len(), 2);
        assert_eq!(verdicts[0].evidence[0].title, "t0");
    }

    #[tokio::test]
    async fn test_failures_are_isolated_and_order_kept() {
        let sentences = vec![
            Sentence::new("The sky is blue."),
            Sentence::new("Cats are mammals."),
            Sentence::new("Water boils at 100 degrees."),
        ];
        let verdicts = prober(Arc::new(PanickyOnCats)).probe_all(&sentences).await;

        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0].sentence, "The sky is blue.");
        assert!(!verdicts[0].matched);
        assert_eq!(verdicts[1].sentence, "Cats are mammals.");
        assert!(!verdicts[1].matched);
        assert!(verdicts[2].matched);
    }

    /// Every lookup waits until `parties` lookups have arrived.
    struct GatedSearch {
        gate: tokio::sync::Barrier,
    }

    #[async_trait]
    impl SearchProvider for GatedSearch {
        async fn search(&self, _query: &str) -> SearchOutcome {
            self.gate.wait().await;
            SearchOutcome::Items(vec![item("gate")])
        }
    }

    /// Records the highest number of lookups running at the same time.
    struct PeakTracking {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for PeakTracking {
        async fn search(&self, _query: &str) -> SearchOutcome {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            SearchOutcome::Items(Vec::new())
        }
    }

    fn numbered_sentences(n: usize) -> Vec<Sentence> {
        (0..n)
            .map(|i| Sentence::new(format!("Sentence number {} is here.", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_default_config_issues_every_lookup_at_once() {
        let sentences = numbered_sentences(20);
        let search = Arc::new(GatedSearch {
            gate: tokio::sync::Barrier::new(sentences.len()),
        });

        let verdicts = tokio::time::timeout(
            std::time::Duration::from_secs(3),
            prober(search).probe_all(&sentences),
        )
        .await
        .expect("all lookups should be in flight together");

        assert_eq!(verdicts.len(), 20);
        assert!(verdicts.iter().all(|v| v.matched));
    }

    #[tokio::test]
    async fn test_max_in_flight_caps_concurrent_lookups() {
        let search = Arc::new(PeakTracking {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let settings = SearchConfig {
            max_in_flight: 3,
            ..SearchConfig::default()
        };
        let p = OriginalityProber::new(search.clone(), &settings);

        let verdicts = p.probe_all(&numbered_sentences(12)).await;

        assert_eq!(verdicts.len(), 12);
        let peak = search.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency was {}", peak);
        assert!(peak >= 2, "lookups never overlapped");
        assert_eq!(search.current.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_fields_get_placeholders() {
        let outcome = SearchOutcome::Items(vec![SearchItem::default()]);
        let verdict = classify("A b c.", outcome, 2);
        assert!(verdict.matched);
        assert_eq!(
            verdict.evidence[0],
            EvidenceSource {
                title: "Unknown Source".to_string(),
                link: "#".to_string(),
                snippet: "No snippet available".to_string(),
            }
        );
    }

    #[test]
    fn test_error_marker_is_unmatched() {
        let verdict = classify("A b c.", SearchOutcome::Error("Missing Google API key or CX".into()), 2);
        assert!(!verdict.matched);
        assert!(verdict.evidence.is_empty());
        let empty = classify("A b c.", SearchOutcome::Items(vec![]), 2);
        assert!(!empty.matched);
    }
}
