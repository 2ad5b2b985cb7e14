use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod archive;
mod cli;
mod config;
mod essay;
mod scrape;
mod semantic;
mod storage;
#[cfg(test)]
mod tests;

use app::{
    commands::{self, ScrapeArgs, SearchArgs, UploadArgs},
    AppContext,
};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    dotenv::dotenv().ok();
    init_logging();

    match args.command {
        cli::Command::Scrape {
            limit,
            no_embeddings,
        } => {
            let ctx = AppContext::load()?;
            let essays = commands::scrape(
                &ctx,
                ScrapeArgs {
                    limit,
                    no_embeddings,
                },
            )?;
            println!("{} essays scraped", essays.len());
            Ok(())
        }

        // errors are reported, not propagated: the exit code stays zero
        cli::Command::Upload { delay_ms } => {
            println!(
                "{}",
                commands::upload_summary(AppContext::load, UploadArgs { delay_ms })
            );
            Ok(())
        }

        cli::Command::Search {
            question,
            count,
            threshold,
        } => {
            let ctx = AppContext::load()?;
            let matches = commands::search(
                &ctx,
                SearchArgs {
                    question,
                    count,
                    threshold,
                },
            )?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
            Ok(())
        }
    }
}
