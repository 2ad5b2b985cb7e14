use std::time::Duration;

use crate::{
    archive,
    config::ConfigError,
    essay::EssayRecord,
    semantic::{Embedder, OpenAiEmbedder},
};

use super::{
    context::AppContext,
    errors::AppError,
    pipeline::{self, ScrapeOpts},
    remote::{EssayStore, MatchedEssay},
    sync::{SyncReport, Synchronizer},
};

#[derive(Debug, Clone, Default)]
pub struct ScrapeArgs {
    pub limit: Option<usize>,
    pub no_embeddings: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UploadArgs {
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub question: String,
    pub count: Option<usize>,
    pub threshold: Option<f32>,
}

pub fn scrape(ctx: &AppContext, args: ScrapeArgs) -> Result<Vec<EssayRecord>, AppError> {
    let config = &ctx.config().scrape;
    let fetcher = ctx.fetcher()?;
    let embedder = if args.no_embeddings {
        None
    } else {
        embedder_or_skip(ctx)
    };

    let opts = ScrapeOpts {
        limit: args.limit,
        delay: Duration::from_millis(config.delay_ms),
    };

    pipeline::run_scrape(
        &fetcher,
        embedder.as_ref().map(|e| e as &dyn Embedder),
        ctx.storage(),
        config,
        &opts,
    )
}

pub fn upload(ctx: &AppContext, args: UploadArgs) -> Result<SyncReport, AppError> {
    log::info!("Starting essay upload...");

    let store = ctx.store()?;
    let embedder = embedder_or_skip(ctx);
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(ctx.config().remote.delay_ms));

    log::info!("Connecting to store at: {}", store.remote_addr());
    let synchronizer = Synchronizer::new(
        &store,
        embedder.as_ref().map(|e| e as &dyn Embedder),
        delay,
    );
    synchronizer.check_connection()?;

    let essays = archive::load_essays(ctx.storage())?;
    let report = synchronizer.run(&essays);

    log::info!("Upload complete!");
    Ok(report)
}

/// Run `upload` from a freshly loaded context and render the outcome as the
/// line shown to the operator. Failures, config loading included, end up in
/// that line instead of the exit code.
pub fn upload_summary(
    load: impl FnOnce() -> Result<AppContext, ConfigError>,
    args: UploadArgs,
) -> String {
    let result = load()
        .map_err(AppError::from)
        .and_then(|ctx| upload(&ctx, args));

    match result {
        Ok(report) => format!(
            "{} inserted, {} updated, {} failed",
            report.inserted, report.updated, report.failed
        ),
        Err(err) => format!("An error occurred: {err}"),
    }
}

/// Embedder for the scrape and upload stages. A client that cannot be built
/// only costs the embeddings, never the run.
pub fn embedder_or_skip(ctx: &AppContext) -> Option<OpenAiEmbedder> {
    match ctx.embedder() {
        Ok(embedder) => embedder,
        Err(err) => {
            log::error!("Embeddings disabled: {err}");
            None
        }
    }
}

pub fn search(ctx: &AppContext, args: SearchArgs) -> Result<Vec<MatchedEssay>, AppError> {
    let remote = &ctx.config().remote;
    let embedder = ctx
        .embedder()?
        .ok_or(ConfigError::MissingEnv("OPENAI_API_KEY"))?;
    let store = ctx.store()?;

    find_matches(
        &embedder,
        &store,
        &args.question,
        args.threshold.unwrap_or(remote.match_threshold),
        args.count.unwrap_or(remote.match_count),
    )
}

/// Embed the question and ask the store for its nearest essays.
pub fn find_matches(
    embedder: &dyn Embedder,
    store: &dyn EssayStore,
    question: &str,
    threshold: f32,
    count: usize,
) -> Result<Vec<MatchedEssay>, AppError> {
    let query_embedding = embedder.embed(question)?;
    let matches = store.match_essays(&query_embedding, threshold, count)?;

    log::info!("Found {} matching essays", matches.len());
    Ok(matches)
}
