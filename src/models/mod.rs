// OriginCheck Data Models
// Shapes shared by the check pipeline, the rewrite chain and the host boundary

use serde::{Deserialize, Serialize};

use crate::services::text_processor::word_count;

// ============ Segmentation ============

/// A contiguous span of text ending in a sentence terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub text: String,
    pub word_count: usize,
}

impl Sentence {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = word_count(&text);
        Self { text, word_count }
    }
}

// ============ Originality Check ============

/// One external search hit backing a matched verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceVerdict {
    #[serde(rename = "chunk")]
    pub sentence: String,
    #[serde(rename = "isPlagiarized")]
    pub matched: bool,
    #[serde(rename = "sources", default)]
    pub evidence: Vec<EvidenceSource>,
}

impl SentenceVerdict {
    pub fn unmatched(sentence: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            matched: false,
            evidence: Vec::new(),
        }
    }
}

/// Presentation band for a document score. Lower bounds are exclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    High,
    Moderate,
    Low,
    Minimal,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score > 75 {
            Self::High
        } else if score > 40 {
            Self::Moderate
        } else if score > 10 {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            Self::High => "High similarity detected. Revision is strongly recommended.",
            Self::Moderate => "Moderate similarity found. Review advised.",
            Self::Low => "Low similarity. The document appears to be mostly original.",
            Self::Minimal => "Excellent! Very low similarity detected.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub score: u8,
    pub total_sentences: usize,
    pub matched_sentences: usize,
    pub band: ScoreBand,
    pub results: Vec<SentenceVerdict>,
}

// ============ Rewrite ============

/// Which stage of the fix chain produced a rewrite.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewriteSource {
    #[serde(rename = "watsonx")]
    Primary,
    #[serde(rename = "custom")]
    FallbackEngine,
    #[serde(rename = "fallback")]
    FallbackStatic,
}

impl RewriteSource {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::FallbackEngine => "fallback-engine",
            Self::FallbackStatic => "fallback-static",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResult {
    pub success: bool,
    pub fixed_text: String,
    pub source: RewriteSource,
}

// ============ Boundary Requests ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixRequest {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_word_count() {
        let s = Sentence::new("Water boils at 100 degrees.");
        assert_eq!(s.word_count, 5);
        assert_eq!(Sentence::new("Hi.").word_count, 1);
    }

    #[test]
    fn test_score_band_boundaries_are_exclusive() {
        assert_eq!(ScoreBand::from_score(100), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(76), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(75), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(41), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(40), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(11), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(10), ScoreBand::Minimal);
        assert_eq!(ScoreBand::from_score(0), ScoreBand::Minimal);
    }

    #[test]
    fn test_verdict_wire_names() {
        let verdict = SentenceVerdict {
            sentence: "Cats are mammals.".to_string(),
            matched: true,
            evidence: vec![EvidenceSource {
                title: "Cats".to_string(),
                link: "https://example.org/cats".to_string(),
                snippet: "Cats are mammals".to_string(),
            }],
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["chunk"], "Cats are mammals.");
        assert_eq!(json["isPlagiarized"], true);
        assert_eq!(json["sources"][0]["link"], "https://example.org/cats");
    }

    #[test]
    fn test_rewrite_source_wire_and_tag() {
        let result = RewriteResult {
            success: false,
            fixed_text: "x".to_string(),
            source: RewriteSource::FallbackStatic,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["fixedText"], "x");
        assert_eq!(RewriteSource::FallbackEngine.tag(), "fallback-engine");
        assert_eq!(
            serde_json::to_value(RewriteSource::Primary).unwrap(),
            "watsonx"
        );
    }
}
