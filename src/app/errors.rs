use crate::{
    app::remote::StoreError, archive::ArchiveError, config::ConfigError,
    scrape::ScrapeError, semantic::EmbeddingError,
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("{0}")]
    Archive(#[from] ArchiveError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
