// Score Aggregation
// Combines per-sentence verdicts into the document score and band

use crate::models::{CheckResult, ScoreBand, SentenceVerdict};

/// round(100 * matched / total), 0 for an empty document.
///
/// `total` counts every segmented sentence, including the short ones that
/// never reach the search lookup.
pub fn compute_score(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let matched = matched.min(total);
    (100.0 * matched as f64 / total as f64).round() as u8
}

pub fn aggregate_verdicts(verdicts: Vec<SentenceVerdict>, total_sentences: usize) -> CheckResult {
    let matched = verdicts.iter().filter(|v| v.matched).count();
    let score = compute_score(matched, total_sentences);

    CheckResult {
        score,
        total_sentences,
        matched_sentences: matched,
        band: ScoreBand::from_score(score),
        results: verdicts,
    }
}
