use std::time::Duration;

use crate::{
    app::remote::SupabaseStore,
    config::{self, Config, ConfigError, Credentials},
    scrape::{HttpFetcher, ScrapeError},
    semantic::{EmbeddingError, OpenAiEmbedder},
    storage::BackendLocal,
};

/// Everything one command invocation needs. Clients are built on demand from
/// here and live only as long as the command that asked for them.
pub struct AppContext {
    config: Config,
    credentials: Credentials,
    storage: BackendLocal,
}

impl AppContext {
    pub fn new(config: Config, credentials: Credentials, storage: BackendLocal) -> Self {
        Self {
            config,
            credentials,
            storage,
        }
    }

    /// Load config and credentials for the data directory in use.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config::data_dir(), Credentials::from_env())
    }

    pub fn load_from(data_dir: &str, credentials: Credentials) -> Result<Self, ConfigError> {
        let config = Config::load_with(data_dir)?;
        let storage = BackendLocal::new(data_dir)?;

        Ok(Self::new(config, credentials, storage))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &BackendLocal {
        &self.storage
    }

    fn timeout(&self) -> Duration {
        self.config.scrape.timeout()
    }

    pub fn fetcher(&self) -> Result<HttpFetcher, ScrapeError> {
        HttpFetcher::new(&self.config.scrape)
    }

    /// `None` when there is no usable API key.
    pub fn embedder(&self) -> Result<Option<OpenAiEmbedder>, EmbeddingError> {
        let embedder = self
            .credentials
            .embedding_key()
            .map(|key| OpenAiEmbedder::new(key, &self.config.embedding, self.timeout()))
            .transpose()?;

        if let Some(embedder) = &embedder {
            log::debug!(
                "embedding with {} ({} dimensions)",
                embedder.model(),
                embedder.dimensions()
            );
        }

        Ok(embedder)
    }

    pub fn store(&self) -> Result<SupabaseStore, crate::app::AppError> {
        let (url, key) = self.credentials.store()?;

        Ok(SupabaseStore::new(
            url,
            key,
            &self.config.remote.table,
            self.timeout(),
        )?)
    }
}
