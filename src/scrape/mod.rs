pub mod essay;
pub mod links;

pub use essay::scrape_essay;
pub use links::{discover_links, EssayLink};

use std::error::Error;

use crate::config::ScrapeConfig;

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{url}: {message}")]
    Request { url: String, message: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Anything that can turn a url into page html.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

/// Single-attempt blocking GET. Failures surface to the caller untouched.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .pool_idle_timeout(config.timeout())
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let url_parsed = url::Url::parse(url).map_err(|source| ScrapeError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let host = url_parsed.host_str().unwrap_or_default();
        let path = url_parsed.path();
        let iden = format!("{host}{path}");

        log::debug!("{iden}: requesting");

        let resp = self
            .client
            .get(url_parsed.clone())
            .send()
            .map_err(|err| ScrapeError::Request {
                url: url.to_string(),
                message: get_error(&err),
            })?;

        let status = resp.status();

        // error pages still get parsed, same as any other page
        if !status.is_success() {
            log::warn!("{iden}: {:?}", status.to_string());
        }

        let bytes = resp.bytes().map_err(|err| ScrapeError::Request {
            url: url.to_string(),
            message: get_error(&err),
        })?;

        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}
