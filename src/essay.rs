use serde::{Deserialize, Serialize};

/// Date recorded when no "Month Year" token can be found in an essay.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Vector size requested from the embeddings API.
pub const EMBEDDING_DIMENSIONS: usize = 1536;

/// One scraped essay.
///
/// `url` is the natural key in both the local archive and the remote table.
/// The embedding only ever lives in memory: it is skipped by serde, so the
/// archived form is always `{title, url, content, date}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EssayRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "unknown_date")]
    pub date: String,

    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

fn unknown_date() -> String {
    UNKNOWN_DATE.to_string()
}

impl EssayRecord {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            date: date.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Option<Vec<f32>>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_never_serialized() {
        let essay = EssayRecord::new("Title", "https://paulgraham.com/a.html", "text", "May 2001")
            .with_embedding(Some(vec![0.5; EMBEDDING_DIMENSIONS]));
        assert!(essay.has_embedding());

        let json = serde_json::to_value(&essay).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 4);
        assert!(object.get("embedding").is_none());
        assert_eq!(object["date"], "May 2001");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let essay: EssayRecord =
            serde_json::from_str(r#"{"url": "https://paulgraham.com/a.html"}"#).unwrap();
        assert_eq!(essay.title, "");
        assert_eq!(essay.content, "");
        assert_eq!(essay.date, UNKNOWN_DATE);
        assert!(essay.embedding.is_none());
    }

    #[test]
    fn test_embedding_key_in_input_is_ignored() {
        let essay: EssayRecord = serde_json::from_str(
            r#"{"title": "t", "url": "u", "content": "c", "date": "d", "embedding": [1.0]}"#,
        )
        .unwrap();
        assert!(!essay.has_embedding());
    }
}
