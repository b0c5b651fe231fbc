// Sentence Segmenter
// Splits whitespace-normalized text on runs of terminal punctuation.
// Every emitted sentence ends with a single '.', whatever its original terminator.

use crate::models::Sentence;
use crate::services::text_processor::normalize_whitespace;
use regex::Regex;
use std::sync::OnceLock;

/// Fragments used by the check pipeline only need to be non-empty.
pub const CHECK_MIN_FRAGMENT_CHARS: usize = 0;
/// The rewrite layers drop fragments of five characters or fewer.
pub const REWRITE_MIN_FRAGMENT_CHARS: usize = 5;

fn terminator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("terminator pattern"))
}

/// Split `text` on terminator runs, keeping trimmed fragments longer than
/// `min_chars` characters and appending a '.' to each.
pub fn split_fragments(text: &str, min_chars: usize) -> Vec<String> {
    terminator_re()
        .split(text)
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > min_chars)
        .map(|fragment| format!("{}.", fragment))
        .collect()
}

/// Segment raw input into sentences for originality checking.
pub fn segment_sentences(text: &str) -> Vec<Sentence> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    split_fragments(&normalized, CHECK_MIN_FRAGMENT_CHARS)
        .into_iter()
        .map(Sentence::new)
        .collect()
}

/// Segment already-normalized text for the rewrite layers.
pub fn segment_for_rewrite(text: &str) -> Vec<String> {
    split_fragments(text, REWRITE_MIN_FRAGMENT_CHARS)
}
