// Rewrite Resources
// Read-only word tables built once and shared by every rewrite

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Lowercase word -> ordered synonym candidates (at least four each).
#[derive(Debug, Clone)]
pub struct SynonymDatabase {
    entries: HashMap<String, Vec<String>>,
}

impl SynonymDatabase {
    pub fn from_pairs(pairs: &[(&str, &[&str])]) -> Self {
        let entries = pairs
            .iter()
            .map(|(word, synonyms)| {
                (
                    word.to_lowercase(),
                    synonyms.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_SYNONYMS)
    }

    pub fn candidates(&self, word: &str) -> Option<&[String]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sentence starters, clause connectors and verb near-synonyms.
#[derive(Debug, Clone)]
pub struct StyleResource {
    pub starters: Vec<String>,
    /// Loaded with the rest of the style tables; no rewrite layer draws from it.
    pub connectors: Vec<String>,
    pub verb_variants: HashMap<String, Vec<String>>,
    pub boilerplate: Vec<String>,
}

impl StyleResource {
    pub fn builtin() -> Self {
        Self {
            starters: to_strings(ACADEMIC_STARTERS),
            connectors: to_strings(CLAUSE_CONNECTORS),
            verb_variants: VERB_VARIANTS
                .iter()
                .map(|(verb, variants)| (verb.to_string(), to_strings(variants)))
                .collect(),
            boilerplate: to_strings(BOILERPLATE_PHRASES),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Process-wide synonym table
pub fn synonyms() -> Arc<SynonymDatabase> {
    static DB: OnceLock<Arc<SynonymDatabase>> = OnceLock::new();
    Arc::clone(DB.get_or_init(|| Arc::new(SynonymDatabase::builtin())))
}

/// Process-wide style tables
pub fn style() -> Arc<StyleResource> {
    static STYLE: OnceLock<Arc<StyleResource>> = OnceLock::new();
    Arc::clone(STYLE.get_or_init(|| Arc::new(StyleResource::builtin())))
}

const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    ("artificial", &["synthetic", "simulated", "computerized", "machine-driven"]),
    ("intelligence", &["cognition", "reasoning", "intellect", "brainpower"]),
    ("branch", &["field", "domain", "discipline", "specialty"]),
    ("computer", &["digital", "computing", "electronic", "automated"]),
    ("science", &["discipline", "field", "study", "domain"]),
    ("focuses", &["concentrates", "centers", "specializes", "emphasizes"]),
    ("creating", &["developing", "building", "designing", "constructing"]),
    ("machines", &["systems", "devices", "computers", "automata"]),
    ("capable", &["able", "competent", "proficient", "equipped"]),
    ("performing", &["executing", "carrying out", "accomplishing", "conducting"]),
    ("tasks", &["functions", "operations", "activities", "duties"]),
    ("normally", &["typically", "usually", "conventionally", "customarily"]),
    ("require", &["need", "demand", "necessitate", "call for"]),
    ("human", &["person", "individual", "cognitive", "mental"]),
    ("important", &["crucial", "vital", "paramount", "essential", "critical", "significant"]),
    ("increase", &["boost", "raise", "enhance", "amplify", "elevate", "escalate"]),
    ("decrease", &["reduce", "lower", "diminish", "lessen", "decline", "drop"]),
    ("explain", &["clarify", "elucidate", "expound", "delineate", "interpret"]),
    ("show", &["demonstrate", "reveal", "display", "exhibit", "illustrate", "manifest"]),
    ("cause", &["trigger", "precipitate", "provoke", "generate", "instigate"]),
    ("effect", &["outcome", "consequence", "result", "ramification", "impact"]),
    ("problem", &["issue", "challenge", "dilemma", "obstacle", "complication"]),
    ("solution", &["resolution", "remedy", "answer", "fix", "approach"]),
    ("study", &["research", "investigation", "analysis", "examination", "inquiry"]),
    ("find", &["discover", "uncover", "identify", "determine", "ascertain"]),
    ("people", &["individuals", "persons", "populace", "society", "community"]),
    ("good", &["beneficial", "advantageous", "favorable", "positive", "superior"]),
    ("bad", &["detrimental", "adverse", "negative", "unfavorable", "harmful"]),
    ("many", &["numerous", "multiple", "various", "myriad", "copious"]),
    ("big", &["substantial", "considerable", "significant", "extensive", "large-scale"]),
];

const ACADEMIC_STARTERS: &[&str] = &[
    "Current scholarly discourse reveals that",
    "Empirical evidence demonstrates that",
    "Theoretical frameworks suggest that",
    "Methodological analysis indicates that",
    "Comprehensive research establishes that",
];

const CLAUSE_CONNECTORS: &[&str] = &[
    "furthermore",
    "consequently",
    "accordingly",
    "nevertheless",
    "conversely",
    "similarly",
    "additionally",
    "subsequently",
];

const VERB_VARIANTS: &[(&str, &[&str])] = &[
    ("is", &["represents", "constitutes", "embodies", "signifies"]),
    ("are", &["comprise", "represent", "constitute", "form"]),
    ("has", &["possesses", "contains", "incorporates", "exhibits"]),
    ("have", &["contain", "include", "embrace", "demonstrate"]),
    ("shows", &["demonstrates", "illustrates", "reveals", "indicates"]),
    ("proves", &["validates", "confirms", "substantiates", "corroborates"]),
];

// Lowercase; matched case-insensitively.
const BOILERPLATE_PHRASES: &[&str] = &[
    "it is important to",
    "in conclusion",
    "research has shown",
    "studies indicate",
    "it can be seen that",
];
