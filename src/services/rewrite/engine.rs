// Rewrite Engine
// Local six-layer fallback rewriter. Each layer consumes the full output of the
// previous one. Output varies between calls unless the random source is fixed.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::debug;

use crate::services::config_store::RewriteConfig;
use crate::services::sentence_segmenter::segment_for_rewrite;
use crate::services::text_processor::{
    capitalize_first, lowercase_first, normalize_whitespace, preserve_capitalization,
};

use super::focus_rules::{apply_first_match, focus_rules, FocusRule};
use super::random::{RandomSource, RngSource};
use super::resources::{self, StyleResource, SynonymDatabase};

/// Appended to every engine rewrite to mark where it came from
pub const ENGINE_SUFFIX: &str = " [Custom Fix]";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RewriteError {
    #[error("Nothing to rewrite")]
    EmptyInput,
    #[error("Rewrite produced no usable text")]
    EmptyOutput,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RewriteLayer {
    LexicalSubstitution,
    SentenceRestructuring,
    FocusShift,
    VerbSubstitution,
    StyleNormalization,
    CheckerCleanup,
}

impl RewriteLayer {
    pub const ALL: [RewriteLayer; 6] = [
        RewriteLayer::LexicalSubstitution,
        RewriteLayer::SentenceRestructuring,
        RewriteLayer::FocusShift,
        RewriteLayer::VerbSubstitution,
        RewriteLayer::StyleNormalization,
        RewriteLayer::CheckerCleanup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LexicalSubstitution => "lexical_substitution",
            Self::SentenceRestructuring => "sentence_restructuring",
            Self::FocusShift => "focus_shift",
            Self::VerbSubstitution => "verb_substitution",
            Self::StyleNormalization => "style_normalization",
            Self::CheckerCleanup => "checker_cleanup",
        }
    }
}

/// Anything that can rewrite a passage locally when the primary service is out.
pub trait FallbackRewriter: Send + Sync {
    fn rewrite_text(&self, text: &str) -> Result<String, RewriteError>;
}

fn passive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+) (\w+?)s? (.+)$").expect("passive pattern"))
}

pub struct RewriteEngine {
    settings: RewriteConfig,
    synonyms: Arc<SynonymDatabase>,
    style: Arc<StyleResource>,
    rules: &'static [FocusRule],
    boilerplate: Vec<Regex>,
}

impl RewriteEngine {
    pub fn new(settings: RewriteConfig) -> Self {
        Self::with_resources(settings, resources::synonyms(), resources::style())
    }

    pub fn with_resources(
        settings: RewriteConfig,
        synonyms: Arc<SynonymDatabase>,
        style: Arc<StyleResource>,
    ) -> Self {
        let boilerplate = style
            .boilerplate
            .iter()
            .filter_map(|phrase| Regex::new(&format!("(?i){}", regex::escape(phrase))).ok())
            .collect();

        Self {
            settings,
            synonyms,
            style,
            rules: focus_rules(),
            boilerplate,
        }
    }

    /// Run all six layers in order and tag the result.
    pub fn rewrite(&self, text: &str, rng: &mut dyn RandomSource) -> Result<String, RewriteError> {
        let mut current = normalize_whitespace(text);
        if current.is_empty() {
            return Err(RewriteError::EmptyInput);
        }

        for layer in RewriteLayer::ALL {
            current = self.apply_layer(layer, &current, rng);
            debug!(layer = layer.name(), chars = current.chars().count(), "[REWRITE] layer applied");
        }

        if current.is_empty() {
            return Err(RewriteError::EmptyOutput);
        }
        Ok(format!("{}{}", current, ENGINE_SUFFIX))
    }

    pub fn apply_layer(&self, layer: RewriteLayer, text: &str, rng: &mut dyn RandomSource) -> String {
        match layer {
            RewriteLayer::LexicalSubstitution => self.substitute_synonyms(text, rng),
            RewriteLayer::SentenceRestructuring => self.restructure_sentences(text, rng),
            RewriteLayer::FocusShift => self.shift_focus(text),
            RewriteLayer::VerbSubstitution => self.substitute_verbs(text, rng),
            RewriteLayer::StyleNormalization => self.apply_academic_style(text, rng),
            RewriteLayer::CheckerCleanup => self.strip_boilerplate(text),
        }
    }

    // Layer 1
    fn substitute_synonyms(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        text.split_whitespace()
            .map(|token| {
                let key: String = token
                    .chars()
                    .filter(|c| c.is_ascii_alphabetic())
                    .collect::<String>()
                    .to_lowercase();

                match self.synonyms.candidates(&key) {
                    Some(candidates) if rng.chance(self.settings.substitution_probability) => {
                        match draw_synonym(candidates, self.settings.synonym_skip, rng) {
                            Some(synonym) => replace_word(token, synonym),
                            None => token.to_string(),
                        }
                    }
                    _ => token.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Layer 2
    fn restructure_sentences(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        segment_for_rewrite(text)
            .into_iter()
            .map(|sentence| match rng.pick(4) {
                0 => to_passive(&sentence),
                1 => self.prepend_starter(&sentence, rng),
                2 => rotate_clauses(&sentence),
                _ => split_long_sentence(&sentence, self.settings.split_threshold_words),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn prepend_starter(&self, sentence: &str, rng: &mut dyn RandomSource) -> String {
        match self.pick_starter(rng) {
            Some(starter) => format!("{} {}", starter, lowercase_first(sentence)),
            None => sentence.to_string(),
        }
    }

    fn pick_starter(&self, rng: &mut dyn RandomSource) -> Option<&str> {
        if self.style.starters.is_empty() {
            return None;
        }
        let idx = rng.pick(self.style.starters.len());
        self.style.starters.get(idx).map(String::as_str)
    }

    // Layer 3
    fn shift_focus(&self, text: &str) -> String {
        segment_for_rewrite(text)
            .into_iter()
            .map(|sentence| {
                let body = sentence.trim_end_matches('.');
                let shifted = apply_first_match(self.rules, body);
                format!("{}.", capitalize_first(shifted.trim_end_matches('.')))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Layer 4
    fn substitute_verbs(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        text.split_whitespace()
            .map(|token| {
                let (_, word, _) = split_affixes(token);
                let variants = self.style.verb_variants.get(&word.to_lowercase());
                match variants {
                    Some(variants)
                        if !variants.is_empty() && rng.chance(self.settings.verb_probability) =>
                    {
                        let choice = &variants[rng.pick(variants.len())];
                        replace_word(token, choice)
                    }
                    _ => token.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Layer 5
    fn apply_academic_style(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        segment_for_rewrite(text)
            .into_iter()
            .enumerate()
            .map(|(idx, sentence)| {
                if idx % 3 != 0 {
                    return sentence;
                }
                match self.pick_starter(rng) {
                    Some(starter) => format!("{} {}", starter, sentence.to_lowercase()),
                    None => sentence,
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // Layer 6
    fn strip_boilerplate(&self, text: &str) -> String {
        let stripped = self
            .boilerplate
            .iter()
            .fold(text.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());
        normalize_whitespace(&stripped)
    }
}

impl FallbackRewriter for RewriteEngine {
    fn rewrite_text(&self, text: &str) -> Result<String, RewriteError> {
        let mut rng = RngSource::from_entropy();
        self.rewrite(text, &mut rng)
    }
}

/// Draw from the candidates after the first `skip` entries.
fn draw_synonym<'a>(candidates: &'a [String], skip: usize, rng: &mut dyn RandomSource) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }
    if candidates.len() <= skip {
        return Some(candidates[0].as_str());
    }
    let idx = skip + rng.pick(candidates.len() - skip);
    candidates.get(idx).map(String::as_str)
}

/// Split a token into (leading punctuation, word, trailing punctuation).
fn split_affixes(token: &str) -> (&str, &str, &str) {
    let start = token.find(char::is_alphabetic).unwrap_or(token.len());
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(start);
    (&token[..start], &token[start..end], &token[end..])
}

/// Swap the word inside `token`, keeping punctuation and the leading capital.
fn replace_word(token: &str, replacement: &str) -> String {
    let (prefix, word, suffix) = split_affixes(token);
    format!("{}{}{}", prefix, preserve_capitalization(word, replacement), suffix)
}

fn past_participle(verb: &str) -> String {
    if verb.ends_with('e') {
        format!("{}d", verb)
    } else {
        format!("{}ed", verb)
    }
}

/// `Subject Verb Object.` -> `Object is Verbed by Subject.`
fn to_passive(sentence: &str) -> String {
    if sentence.contains(" is ") || sentence.contains(" are ") {
        return sentence.to_string();
    }

    let body = sentence.trim_end_matches('.');
    match passive_re().captures(body) {
        Some(caps) => {
            let object = caps[3].trim();
            format!(
                "{} is {} by {}.",
                capitalize_first(object),
                past_participle(&caps[2]),
                &caps[1]
            )
        }
        None => sentence.to_string(),
    }
}

/// Move the clause before the first comma to the end.
fn rotate_clauses(sentence: &str) -> String {
    let Some((head, tail)) = sentence.split_once(',') else {
        return sentence.to_string();
    };

    let head = head.trim();
    let tail = tail.trim().trim_end_matches('.').trim();
    if head.is_empty() || tail.is_empty() {
        return sentence.to_string();
    }
    format!("{}, {}.", capitalize_first(tail), lowercase_first(head))
}

/// Break a sentence with more than `threshold` words at its midpoint.
fn split_long_sentence(sentence: &str, threshold: usize) -> String {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.len() <= threshold {
        return sentence.to_string();
    }

    let mid = words.len() / 2;
    let first = words[..mid].join(" ");
    let second = words[mid..].join(" ");
    format!(
        "{}. {}.",
        first.trim_end_matches([',', ';']),
        capitalize_first(second.trim_end_matches('.'))
    )
}
