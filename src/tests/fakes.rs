//! In-memory stand-ins for the site, the embeddings API and the remote table.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::app::remote::{EssayRow, EssayStore, MatchedEssay, RowId, StoreError};
use crate::scrape::{PageSource, ScrapeError};
use crate::semantic::{Embedder, EmbeddingError};

pub const INDEX_URL: &str = "https://paulgraham.com/articles.html";

#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, String>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeSite {
    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }
}

impl PageSource for FakeSite {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.requests.borrow_mut().push(url.to_string());

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

/// Index page linking to `essays` as `(href, anchor text)`.
pub fn index_page(essays: &[(&str, &str)]) -> String {
    let anchors: String = essays
        .iter()
        .map(|(href, title)| format!(r#"<a href="{href}">{title}</a><br>"#))
        .collect();

    format!(
        r#"<html><head><title>Essays</title></head><body>
        <a href="articles.html">Essays</a>
        <a href="rss.xml">RSS</a>
        <table><tr><td>{anchors}</td></tr></table>
        </body></html>"#
    )
}

pub fn essay_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <table width="435"><tr><td><font size="2">{body}</font></td></tr></table>
        </body></html>"#
    )
}

/// Returns `[position of the call, 1.0, 1.0, ...]`, failing whenever the
/// input contains one of `fail_on`.
pub struct FakeEmbedder {
    dimensions: usize,
    fail_on: Vec<String>,
    pub inputs: RefCell<Vec<String>>,
}

impl FakeEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            fail_on: vec![],
            inputs: RefCell::new(vec![]),
        }
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }
}

impl Embedder for FakeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.inputs.borrow_mut().push(text.to_string());

        if self.fail_on.iter().any(|needle| text.contains(needle)) {
            return Err(EmbeddingError::Api {
                status: reqwest::StatusCode::TOO_MANY_REQUESTS,
                body: "rate limited".to_string(),
            });
        }

        let mut embedding = vec![1.0; self.dimensions];
        embedding[0] = self.inputs.borrow().len() as f32;
        Ok(embedding)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub content: String,
    pub date: String,
    pub embedding: Option<Vec<f32>>,
}

/// Table keyed by a serial id, with optional per-url write failures.
#[derive(Default)]
pub struct MemoryStore {
    pub rows: RefCell<Vec<StoredRow>>,
    next_id: Cell<i64>,
    fail_urls: Vec<String>,
}

impl MemoryStore {
    pub fn failing_on(mut self, url: &str) -> Self {
        self.fail_urls.push(url.to_string());
        self
    }

    pub fn seed(&self, title: &str, url: &str, embedding: Option<Vec<f32>>) -> i64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.rows.borrow_mut().push(StoredRow {
            id,
            title: title.to_string(),
            url: url.to_string(),
            content: String::new(),
            date: "Unknown".to_string(),
            embedding,
        });
        id
    }

    pub fn rows_for(&self, url: &str) -> Vec<StoredRow> {
        self.rows
            .borrow()
            .iter()
            .filter(|row| row.url == url)
            .cloned()
            .collect()
    }

    fn check(&self, url: &str) -> Result<(), StoreError> {
        if self.fail_urls.iter().any(|u| u == url) {
            return Err(StoreError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("cannot write {url}"),
            });
        }
        Ok(())
    }
}

impl EssayStore for MemoryStore {
    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.rows.borrow().len())
    }

    fn find_id_by_url(&self, url: &str) -> Result<Option<RowId>, StoreError> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|row| row.url == url)
            .map(|row| RowId::Int(row.id)))
    }

    fn insert(&self, row: &EssayRow) -> Result<(), StoreError> {
        self.check(row.url)?;
        let id = self.next_id.get() + 1;
        self.next_id.set(id);

        self.rows.borrow_mut().push(StoredRow {
            id,
            title: row.title.to_string(),
            url: row.url.to_string(),
            content: row.content.to_string(),
            date: row.date.to_string(),
            embedding: row.embedding.map(|e| e.to_vec()),
        });
        Ok(())
    }

    fn update(&self, id: &RowId, row: &EssayRow) -> Result<(), StoreError> {
        self.check(row.url)?;
        let mut rows = self.rows.borrow_mut();
        let stored = rows
            .iter_mut()
            .find(|stored| RowId::Int(stored.id) == *id)
            .ok_or_else(|| StoreError::Api {
                status: reqwest::StatusCode::NOT_FOUND,
                message: format!("no row {id}"),
            })?;

        stored.title = row.title.to_string();
        stored.url = row.url.to_string();
        stored.content = row.content.to_string();
        stored.date = row.date.to_string();
        if let Some(embedding) = row.embedding {
            stored.embedding = Some(embedding.to_vec());
        }
        Ok(())
    }

    fn match_essays(
        &self,
        _query_embedding: &[f32],
        _threshold: f32,
        count: usize,
    ) -> Result<Vec<MatchedEssay>, StoreError> {
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.embedding.is_some())
            .take(count)
            .map(|row| MatchedEssay {
                id: RowId::Int(row.id),
                title: row.title.clone(),
                url: row.url.clone(),
                content: row.content.clone(),
                similarity: Some(0.9),
            })
            .collect())
    }
}
