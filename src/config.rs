use crate::storage::{self, StorageManager};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yaml";

/// Directory holding `essays.json` and `config.yaml` unless `ESSAYS_DATA_DIR` is set.
pub const DEFAULT_DATA_DIR: &str = "data";

const DEFAULT_INDEX_URL: &str = "https://paulgraham.com/articles.html";
const DEFAULT_BASE_URL: &str = "https://paulgraham.com";
const DEFAULT_SCRAPE_DELAY_MS: u64 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";
/// Characters, not tokens. A crude proxy for the model's input budget.
const DEFAULT_MAX_INPUT_CHARS: usize = 8000;

const DEFAULT_TABLE: &str = "essays";
const DEFAULT_UPLOAD_DELAY_MS: u64 = 500;
const DEFAULT_MATCH_THRESHOLD: f32 = 0.5;
const DEFAULT_MATCH_COUNT: usize = 5;

/// Value shipped in `.env` templates; treated the same as no key at all.
const PLACEHOLDER_API_KEY: &str = "YOUR_ACTUAL_API_KEY";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingEnv(&'static str),

    #[error("config io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScrapeConfig {
    /// Page listing every essay
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Relative essay links are resolved against this
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Pause after each scraped essay
    #[serde(default = "default_scrape_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            delay_ms: DEFAULT_SCRAPE_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT_DEFAULT.to_string(),
        }
    }
}

impl ScrapeConfig {
    /// File name of the index page, e.g. `articles.html`. Links pointing back
    /// at it are not essays.
    pub fn index_page(&self) -> &str {
        self.index_url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Input is cut to this many characters before every request
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// OpenAI-compatible API root
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: crate::essay::EMBEDDING_DIMENSIONS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RemoteConfig {
    #[serde(default = "default_table")]
    pub table: String,

    /// Pause after each upserted essay
    #[serde(default = "default_upload_delay_ms")]
    pub delay_ms: u64,

    /// Minimum similarity for `search` results [0.0, 1.0]
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,

    #[serde(default = "default_match_count")]
    pub match_count: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            delay_ms: DEFAULT_UPLOAD_DELAY_MS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            match_count: DEFAULT_MATCH_COUNT,
        }
    }
}

fn default_index_url() -> String {
    DEFAULT_INDEX_URL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_scrape_delay_ms() -> u64 {
    DEFAULT_SCRAPE_DELAY_MS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    USER_AGENT_DEFAULT.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_dimensions() -> usize {
    crate::essay::EMBEDDING_DIMENSIONS
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

fn default_embedding_base_url() -> String {
    DEFAULT_EMBEDDING_BASE_URL.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_upload_delay_ms() -> u64 {
    DEFAULT_UPLOAD_DELAY_MS
}

fn default_match_threshold() -> f32 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_match_count() -> usize {
    DEFAULT_MATCH_COUNT
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("scrape.index_url", &self.scrape.index_url),
            ("scrape.base_url", &self.scrape.base_url),
            ("embedding.base_url", &self.embedding.base_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be an http(s) url, got {value:?}"
                )));
            }
        }

        if self.scrape.index_url.trim().is_empty() || self.scrape.index_page().is_empty() {
            return Err(ConfigError::Invalid(
                "scrape.index_url must point at a page".to_string(),
            ));
        }

        if self.scrape.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "scrape.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimensions must be greater than 0".to_string(),
            ));
        }

        if self.embedding.max_input_chars == 0 {
            return Err(ConfigError::Invalid(
                "embedding.max_input_chars must be greater than 0".to_string(),
            ));
        }

        if self.remote.table.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.table is empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.remote.match_threshold) {
            return Err(ConfigError::Invalid(format!(
                "remote.match_threshold must be between 0.0 and 1.0, got {}",
                self.remote.match_threshold
            )));
        }

        if self.remote.match_count == 0 {
            return Err(ConfigError::Invalid(
                "remote.match_count must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn load_with(base_path: &str) -> Result<Self, ConfigError> {
        let store = storage::BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(
                CONFIG_FILE,
                serde_yml::to_string(&Self::default())?.as_bytes(),
            )?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)
            .map_err(|_| ConfigError::Invalid("config file is not valid utf8".to_string()))?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave so newly added settings show up with their defaults
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }
}

/// Data directory for this run: `ESSAYS_DATA_DIR` or [`DEFAULT_DATA_DIR`].
pub fn data_dir() -> String {
    read_env("ESSAYS_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
}

/// Secrets, always taken from the environment (after `.env` is loaded).
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: read_env("OPENAI_API_KEY"),
            supabase_url: read_env("SUPABASE_URL"),
            supabase_key: read_env("SUPABASE_KEY"),
        }
    }

    /// The embeddings key, if it looks usable.
    pub fn embedding_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .filter(|key| is_valid_api_key(key))
    }

    /// Store url and key. Both are required to talk to the remote table.
    pub fn store(&self) -> Result<(&str, &str), ConfigError> {
        let url = self
            .supabase_url
            .as_deref()
            .ok_or(ConfigError::MissingEnv("SUPABASE_URL"))?;
        let key = self
            .supabase_key
            .as_deref()
            .ok_or(ConfigError::MissingEnv("SUPABASE_KEY"))?;
        Ok((url, key))
    }
}

pub fn is_valid_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_API_KEY
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
