use std::fmt::Display;
use std::time::Duration;

use reqwest::{blocking::RequestBuilder, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::essay::EssayRecord;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("invalid store url {0:?}")]
    InvalidUrl(String),

    #[error("reqwest error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("store returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("unexpected store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Primary key of a remote row. Tables may use serial or uuid keys.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::Int(id) => write!(f, "{id}"),
            RowId::Text(id) => write!(f, "{id}"),
        }
    }
}

/// Body of an insert or update. A missing embedding is left out entirely so
/// an update never clears one that is already stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EssayRow<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub content: &'a str,
    pub date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<&'a [f32]>,
}

impl<'a> EssayRow<'a> {
    pub fn new(essay: &'a EssayRecord, embedding: Option<&'a [f32]>) -> Self {
        Self {
            title: &essay.title,
            url: &essay.url,
            content: &essay.content,
            date: &essay.date,
            embedding,
        }
    }
}

/// A similarity search hit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MatchedEssay {
    pub id: RowId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

/// Keyed essay table. Lookups go by url; writes by row id.
pub trait EssayStore {
    /// Rows currently in the table.
    fn count(&self) -> Result<usize, StoreError>;
    fn find_id_by_url(&self, url: &str) -> Result<Option<RowId>, StoreError>;
    fn insert(&self, row: &EssayRow) -> Result<(), StoreError>;
    fn update(&self, id: &RowId, row: &EssayRow) -> Result<(), StoreError>;
    fn match_essays(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        count: usize,
    ) -> Result<Vec<MatchedEssay>, StoreError>;
}

/// Supabase table reached through its PostgREST endpoint.
pub struct SupabaseStore {
    remote_addr: String,
    api_key: String,
    table: String,
    client: reqwest::blocking::Client,
}

impl SupabaseStore {
    pub fn new(
        addr: &str,
        api_key: &str,
        table: &str,
        timeout: Duration,
    ) -> Result<SupabaseStore, StoreError> {
        if !addr.starts_with("http://") && !addr.starts_with("https://") {
            return Err(StoreError::InvalidUrl(addr.to_string()));
        }

        let remote_addr = addr.strip_suffix("/").unwrap_or(addr).to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(SupabaseStore {
            remote_addr,
            api_key: api_key.to_string(),
            table: table.to_string(),
            client,
        })
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.remote_addr, self.table)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        log::debug!("{method} {url}");

        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text()?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    Err(StoreError::Api { status, message })
}

fn handle_response<T>(response: reqwest::blocking::Response) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let text = check_status(response)?.text()?;

    serde_json::from_str::<T>(&text).map_err(|err| {
        log::error!("{err}. tried to parse: {text:?}");
        err.into()
    })
}

#[derive(Deserialize)]
struct IdOnly {
    id: RowId,
}

impl EssayStore for SupabaseStore {
    fn count(&self) -> Result<usize, StoreError> {
        let resp = self
            .request(Method::GET, &self.table_url())
            .query(&[("select", "id")])
            .send()?;

        // anything other than a list of rows counts as empty
        let value: serde_json::Value = handle_response(resp)?;
        Ok(value.as_array().map(|rows| rows.len()).unwrap_or(0))
    }

    fn find_id_by_url(&self, url: &str) -> Result<Option<RowId>, StoreError> {
        let url_filter = format!("eq.{url}");
        let resp = self
            .request(Method::GET, &self.table_url())
            .query(&[("select", "id"), ("url", url_filter.as_str())])
            .send()?;

        let rows: Vec<IdOnly> = handle_response(resp)?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    fn insert(&self, row: &EssayRow) -> Result<(), StoreError> {
        let resp = self
            .request(Method::POST, &self.table_url())
            .header("Prefer", "return=minimal")
            .json(row)
            .send()?;

        check_status(resp)?;
        Ok(())
    }

    fn update(&self, id: &RowId, row: &EssayRow) -> Result<(), StoreError> {
        let id_filter = format!("eq.{id}");
        let resp = self
            .request(Method::PATCH, &self.table_url())
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(row)
            .send()?;

        check_status(resp)?;
        Ok(())
    }

    fn match_essays(
        &self,
        query_embedding: &[f32],
        threshold: f32,
        count: usize,
    ) -> Result<Vec<MatchedEssay>, StoreError> {
        let url = format!("{}/rest/v1/rpc/match_essays", self.remote_addr);
        let resp = self
            .request(Method::POST, &url)
            .json(&json!({
                "query_embedding": query_embedding,
                "match_threshold": threshold,
                "match_count": count,
            }))
            .send()?;

        handle_response(resp)
    }
}
