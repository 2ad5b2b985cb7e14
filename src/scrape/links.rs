use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::{PageSource, ScrapeError};
use crate::config::ScrapeConfig;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("Failed to compile anchor selector"));

const PAGE_EXTENSION: &str = ".html";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EssayLink {
    pub url: String,
    pub title: String,
}

/// Fetch the index page and list every essay it links to.
pub fn discover_links(
    source: &dyn PageSource,
    config: &ScrapeConfig,
) -> Result<Vec<EssayLink>, ScrapeError> {
    log::info!("Fetching essay links...");
    let html = source.fetch(&config.index_url)?;

    let links = parse_essay_links(&html, &config.base_url, config.index_page());
    log::info!("Found {} essays", links.len());

    Ok(links)
}

/// Every anchor whose href ends in `.html`, except the index page itself, in
/// document order. Duplicates are kept.
pub fn parse_essay_links(html: &str, base_url: &str, index_page: &str) -> Vec<EssayLink> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if !href.ends_with(PAGE_EXTENSION) || href == index_page {
                return None;
            }

            Some(EssayLink {
                url: resolve_href(base_url, href),
                title: anchor.text().collect::<String>().trim().to_string(),
            })
        })
        .collect()
}

fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }

    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        href.trim_start_matches('/')
    )
}
