use std::{thread::sleep, time::Duration};

use crate::{
    archive,
    config::ScrapeConfig,
    essay::EssayRecord,
    scrape::{self, PageSource, ScrapeError},
    semantic::{generate_embedding, Embedder},
    storage::StorageManager,
};

use super::errors::AppError;

#[derive(Debug, Clone, Default)]
pub struct ScrapeOpts {
    /// Only scrape the first `limit` links
    pub limit: Option<usize>,
    /// Pause after each essay
    pub delay: Duration,
}

/// Walk the index and scrape every linked essay, in index order.
///
/// With no `embedder` every record is left without an embedding. A failed
/// embedding only affects its own record; a failed page fetch ends the run.
pub fn collect_essays(
    source: &dyn PageSource,
    embedder: Option<&dyn Embedder>,
    config: &ScrapeConfig,
    opts: &ScrapeOpts,
) -> Result<Vec<EssayRecord>, ScrapeError> {
    let links = scrape::discover_links(source, config)?;
    let limit = opts.limit.unwrap_or(links.len());

    if embedder.is_none() {
        log::info!("Skipping embedding generation (no valid API key found)");
    }

    let mut essays = Vec::with_capacity(limit.min(links.len()));
    for link in links.iter().take(limit) {
        let mut essay = scrape::scrape_essay(source, link)?;

        if let Some(embedder) = embedder {
            log::info!("Generating embedding for: {}", essay.title);
            let embedding = generate_embedding(embedder, &essay.content);
            essay = essay.with_embedding(embedding);
            if essay.has_embedding() {
                log::info!("Embedding generated successfully for: {}", essay.title);
            }
        }

        essays.push(essay);

        if !opts.delay.is_zero() {
            sleep(opts.delay);
        }
    }

    Ok(essays)
}

/// Scrape everything and overwrite the local archive. Returns the records
/// as they were held in memory, embeddings included.
pub fn run_scrape(
    source: &dyn PageSource,
    embedder: Option<&dyn Embedder>,
    storage: &dyn StorageManager,
    config: &ScrapeConfig,
    opts: &ScrapeOpts,
) -> Result<Vec<EssayRecord>, AppError> {
    log::info!("Starting essay scraper...");

    let essays = collect_essays(source, embedder, config, opts)?;
    archive::save_essays(storage, &essays)?;

    log::info!("Scraping complete!");
    Ok(essays)
}
