use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{EssayLink, PageSource, ScrapeError};
use crate::essay::{EssayRecord, UNKNOWN_DATE};

/// Label for the home page when the index gave it no anchor text.
pub const HOME_PAGE_TITLE: &str = "Paul Graham's Essays (Home Page)";

const HOME_PAGE_SUFFIX: &str = "index.html";

/// Elements whose text never shows up on the rendered page.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "template"];

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

static DATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][a-z]+ \d{4})").expect("Failed to compile date regex"));

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile table selector"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("Failed to compile body selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile title selector"));

pub fn scrape_essay(source: &dyn PageSource, link: &EssayLink) -> Result<EssayRecord, ScrapeError> {
    log::info!("Scraping: {} - {}", link.title, link.url);
    let html = source.fetch(&link.url)?;

    Ok(parse_essay(&html, &link.url, &link.title))
}

/// Build a record from page html. The layout is table based, so the first
/// table holds the essay; pages without one fall back to the whole body.
pub fn parse_essay(html: &str, url: &str, title: &str) -> EssayRecord {
    let document = Html::parse_document(html);

    let raw_text = document
        .select(&TABLE_SELECTOR)
        .next()
        .or_else(|| document.select(&BODY_SELECTOR).next())
        .map(visible_text)
        .unwrap_or_default();

    let content = clean_text(&raw_text);
    let date = extract_date(&content);
    let title = resolve_title(&document, url, title);

    EssayRecord::new(title, url, content, date)
}

/// Text nodes under `container`, skipping anything inside script, style or
/// template elements.
fn visible_text(container: ElementRef) -> String {
    container
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });

            (!hidden).then_some(&**text)
        })
        .collect()
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn clean_text(raw: &str) -> String {
    WHITESPACE_REGEX.replace_all(raw, " ").trim().to_string()
}

/// First "Month Year" looking token, or [`UNKNOWN_DATE`].
pub fn extract_date(content: &str) -> String {
    DATE_REGEX
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

fn resolve_title(document: &Html, url: &str, title: &str) -> String {
    if !url.ends_with(HOME_PAGE_SUFFIX) || !title.trim().is_empty() {
        return title.to_string();
    }

    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|page_title| !page_title.is_empty())
        .unwrap_or_else(|| HOME_PAGE_TITLE.to_string())
}
