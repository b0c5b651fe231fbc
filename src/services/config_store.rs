// Configuration Storage Service
// Handles config file read/write, version backup and credential lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const GOOGLE_SEARCH_DEFAULT_URL: &str = "https://www.googleapis.com/customsearch/v1";
const WATSONX_DEFAULT_URL: &str = "https://us-south.ml.cloud.ibm.com";
const WATSONX_IAM_DEFAULT_URL: &str = "https://iam.cloud.ibm.com/identity/token";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub watsonx: WatsonxConfig,
    #[serde(default)]
    pub rewrite: RewriteConfig,
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u8,
    /// Cap on concurrent lookups; 0 issues every lookup at once
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default = "default_max_evidence")]
    pub max_evidence: usize,
}

impl SearchConfig {
    /// Search endpoint; `GOOGLE_SEARCH_URL` wins over the config file.
    pub fn endpoint(&self) -> String {
        env_override("GOOGLE_SEARCH_URL").unwrap_or_else(|| self.base_url.clone())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_url(),
            page_size: default_page_size(),
            max_in_flight: default_max_in_flight(),
            min_words: default_min_words(),
            max_evidence: default_max_evidence(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatsonxConfig {
    #[serde(default = "default_watsonx_url")]
    pub base_url: String,
    #[serde(default = "default_iam_url")]
    pub iam_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_decoding_method")]
    pub decoding_method: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl WatsonxConfig {
    /// Service root; `WATSONX_URL` wins over the config file.
    pub fn service_url(&self) -> String {
        env_override("WATSONX_URL").unwrap_or_else(|| self.base_url.clone())
    }

    /// Request timeout, never below one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Token exchange endpoint; `WATSONX_IAM_URL` wins over the config file.
    pub fn token_url(&self) -> String {
        env_override("WATSONX_IAM_URL").unwrap_or_else(|| self.iam_url.clone())
    }
}

impl Default for WatsonxConfig {
    fn default() -> Self {
        Self {
            base_url: default_watsonx_url(),
            iam_url: default_iam_url(),
            api_version: default_api_version(),
            model_id: default_model_id(),
            decoding_method: default_decoding_method(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteConfig {
    /// Chance that a word found in the synonym table is replaced
    #[serde(default = "default_substitution_probability")]
    pub substitution_probability: f64,
    /// Chance that a copula/evidentiary verb is replaced
    #[serde(default = "default_verb_probability")]
    pub verb_probability: f64,
    /// Leading synonym candidates never drawn by lexical substitution
    #[serde(default = "default_synonym_skip")]
    pub synonym_skip: usize,
    /// Sentences with more words than this may be split in two
    #[serde(default = "default_split_threshold")]
    pub split_threshold_words: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            substitution_probability: default_substitution_probability(),
            verb_probability: default_verb_probability(),
            synonym_skip: default_synonym_skip(),
            split_threshold_words: default_split_threshold(),
        }
    }
}

fn default_search_url() -> String { GOOGLE_SEARCH_DEFAULT_URL.to_string() }
fn default_page_size() -> u8 { 3 }
fn default_max_in_flight() -> usize { 0 }
fn default_min_words() -> usize { 3 }
fn default_max_evidence() -> usize { 2 }
fn default_watsonx_url() -> String { WATSONX_DEFAULT_URL.to_string() }
fn default_iam_url() -> String { WATSONX_IAM_DEFAULT_URL.to_string() }
fn default_api_version() -> String { "2023-05-29".to_string() }
fn default_model_id() -> String { "ibm/granite-13b-chat-v2".to_string() }
fn default_decoding_method() -> String { "greedy".to_string() }
fn default_max_new_tokens() -> u32 { 200 }
fn default_temperature() -> f64 { 0.7 }
fn default_timeout_secs() -> u64 { 30 }
fn default_substitution_probability() -> f64 { 0.4 }
fn default_verb_probability() -> f64 { 0.3 }
fn default_synonym_skip() -> usize { 2 }
fn default_split_threshold() -> usize { 15 }

/// Named secrets the collaborators need.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Credential {
    GoogleApiKey,
    GoogleCx,
    WatsonxApiKey,
    WatsonxProjectId,
}

impl Credential {
    pub const ALL: [Credential; 4] = [
        Credential::GoogleApiKey,
        Credential::GoogleCx,
        Credential::WatsonxApiKey,
        Credential::WatsonxProjectId,
    ];

    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.config_key() == key)
    }

    /// Key used in the `apiKeys` map of the config file
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::GoogleApiKey => "google",
            Self::GoogleCx => "google_cx",
            Self::WatsonxApiKey => "watsonx",
            Self::WatsonxProjectId => "watsonx_project",
        }
    }

    fn env_keys(&self) -> &'static [&'static str] {
        match self {
            Self::GoogleApiKey => &[
                "VITE_GOOGLE_AI_API_KEY",
                "GOOGLE_API_KEY",
                "ORIGINCHECK_GOOGLE_API_KEY",
            ],
            Self::GoogleCx => &["GOOGLE_CX", "ORIGINCHECK_GOOGLE_CX"],
            Self::WatsonxApiKey => &["WATSONX_API_KEY", "ORIGINCHECK_WATSONX_API_KEY"],
            Self::WatsonxProjectId => &["WATSONX_PROJECT_ID", "ORIGINCHECK_WATSONX_PROJECT_ID"],
        }
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("originCheck"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)
    }

    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        let remove_count = entries.len() - keep;
        for entry in entries.iter().take(remove_count) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    pub fn get_credential(&self, credential: Credential) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.api_keys.get(credential.config_key()).cloned())
    }

    pub fn set_credential(&self, credential: Credential, value: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config
            .api_keys
            .insert(credential.config_key().to_string(), value.to_string());
        self.save(&config)
    }

    pub fn delete_credential(&self, credential: Credential) -> Result<(), String> {
        let mut config = self.load()?;
        config.api_keys.remove(credential.config_key());
        self.save(&config)
    }
}

/// Load the config from the default location, falling back to defaults.
pub fn load_default_config() -> AppConfig {
    ConfigStore::default_config_dir()
        .map(ConfigStore::new)
        .and_then(|store| store.load().ok())
        .unwrap_or_default()
}

fn env_override(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve a credential from the environment first, then the config file.
pub fn get_credential(credential: Credential, config: &AppConfig) -> Option<String> {
    if let Some(value) = credential.env_keys().iter().find_map(|key| env_override(key)) {
        return Some(value);
    }

    config
        .api_keys
        .get(credential.config_key())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
