// Focus Shift Rules
// Ordered (pattern, template) pairs; the first pattern that matches a sentence wins.

use regex::Regex;
use std::sync::OnceLock;

pub struct FocusRule {
    pub name: &'static str,
    pattern: Regex,
    template: &'static str,
}

impl FocusRule {
    pub fn new(name: &'static str, pattern: &str, template: &'static str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
            template,
        })
    }

    pub fn apply(&self, sentence: &str) -> Option<String> {
        if !self.pattern.is_match(sentence) {
            return None;
        }
        Some(self.pattern.replace(sentence, self.template).into_owned())
    }
}

const RULE_TABLE: &[(&str, &str, &str)] = &[
    ("subject_inversion", r"(?i)^(\w+) (is|are) (.+)$", "${3} characterizes ${1}"),
    (
        "evidence_reframe",
        r"(?i)^(\w+) (shows|demonstrates) that (.+)$",
        "The evidence from ${1} indicates ${3}",
    ),
    ("studies_show", r"(?i)^Studies show that (.+)$", "Empirical research reveals ${1}"),
    ("importance_shift", r"(?i)^It is important to (.+)$", "Significant value lies in ${1}"),
];

/// Built-in focus rules in evaluation order
pub fn focus_rules() -> &'static [FocusRule] {
    static RULES: OnceLock<Vec<FocusRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        RULE_TABLE
            .iter()
            .filter_map(|(name, pattern, template)| FocusRule::new(name, pattern, template).ok())
            .collect()
    })
}

/// Apply the first matching rule, or return the sentence unchanged.
pub fn apply_first_match(rules: &[FocusRule], sentence: &str) -> String {
    rules
        .iter()
        .find_map(|rule| rule.apply(sentence))
        .unwrap_or_else(|| sentence.to_string())
}
