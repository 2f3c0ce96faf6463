//! Data models for topics, provider articles, and persisted articles.
//!
//! - [`Topic`]: a configured query and the file it is stored under
//! - [`RawArticle`]: one item of the provider's `results` array
//! - [`Article`]: the reduced record written to the per-topic JSON files
//!
//! Deserialization is lenient: a field with an unexpected JSON type is read as
//! `None` instead of rejecting the record.
//! The `pubDate` name matches the provider and front end, hence the
//! `#[serde(rename)]` attributes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A configured news category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Topic {
    /// Output identifier; the article set lives at `<output_dir>/<id>.json`.
    pub id: String,
    /// Human-readable name used in logs.
    pub name: String,
    /// Provider query expression.
    pub query: String,
}

impl Topic {
    pub fn new(id: &str, name: &str, query: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            query: query.to_string(),
        }
    }

    /// Output filename for this topic's article set.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// Topics used when no topics file is given.
pub fn default_topics() -> Vec<Topic> {
    vec![
        Topic::new(
            "ai",
            "Artificial Intelligence",
            "artificial intelligence OR AI OR machine learning",
        ),
        Topic::new(
            "prehistory",
            "Prehistory",
            "prehistory OR paleolithic OR neolithic OR archaeology",
        ),
        Topic::new(
            "uap",
            "UAP",
            "UAP OR UFO OR unidentified anomalous phenomena",
        ),
    ]
}

/// Body of a successful call to the `latest` endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct LatestResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<u64>,
    /// Missing and `null` both mean "no results".
    #[serde(default)]
    pub results: Option<Vec<RawArticle>>,
}

/// One article as delivered by the provider.
///
/// The provider sends many more fields (keywords, creator, country, content,
/// ...). Only the ones that survive normalization are read.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawArticle {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_id: Option<String>,
    #[serde(rename = "pubDate", default, deserialize_with = "lenient::string")]
    pub pub_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub category: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub image_url: Option<String>,
}

/// The persisted article record.
///
/// Absent values are written as `null` so every record in a file has the same
/// keys.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub source_id: Option<String>,
    #[serde(rename = "pubDate", default, deserialize_with = "lenient::string")]
    pub pub_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub category: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub image_url: Option<String>,
    /// When this article was first fetched (RFC 3339, UTC).
    #[serde(default, deserialize_with = "lenient::string")]
    pub fetched_at: Option<String>,
}

impl Article {
    /// The dedup key, if it is usable. Empty links count as missing.
    pub fn dedup_key(&self) -> Option<&str> {
        self.link.as_deref().filter(|l| !l.is_empty())
    }
}

mod lenient {
    use super::*;

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    /// Accepts `"a"` as well as `["a", "b"]`; non-string array items are dropped.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(vec![s]),
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_topics_have_distinct_ids() {
        let topics = default_topics();
        assert_eq!(topics.len(), 3);
        let ids: Vec<_> = topics.iter().map(|t| t.file_name()).collect();
        assert_eq!(ids, vec!["ai.json", "prehistory.json", "uap.json"]);
    }

    #[test]
    fn test_raw_article_ignores_unknown_fields() {
        let json = r#"{
            "article_id": "abc",
            "title": "Bronze age hoard found",
            "link": "https://example.com/hoard",
            "keywords": ["archaeology"],
            "creator": null,
            "pubDate": "2024-03-01 10:00:00",
            "source_id": "example",
            "category": ["science", "top"]
        }"#;
        let raw: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(raw.title.as_deref(), Some("Bronze age hoard found"));
        assert_eq!(raw.pub_date.as_deref(), Some("2024-03-01 10:00:00"));
        assert_eq!(raw.category, Some(vec!["science".to_string(), "top".to_string()]));
        assert_eq!(raw.description, None);
        assert_eq!(raw.image_url, None);
    }

    #[test]
    fn test_raw_article_mistyped_fields_become_none() {
        let json = r#"{"title": 42, "link": ["x"], "description": {"a": 1}, "category": "science"}"#;
        let raw: RawArticle = serde_json::from_str(json).unwrap();
        assert_eq!(raw.title, None);
        assert_eq!(raw.link, None);
        assert_eq!(raw.description, None);
        assert_eq!(raw.category, Some(vec!["science".to_string()]));
    }

    #[test]
    fn test_latest_response_null_results() {
        let resp: LatestResponse =
            serde_json::from_str(r#"{"status": "success", "results": null}"#).unwrap();
        assert!(resp.results.is_none());

        let resp: LatestResponse = serde_json::from_str(r#"{"status": "success"}"#).unwrap();
        assert!(resp.results.is_none());
    }

    #[test]
    fn test_article_serializes_nulls_and_pubdate_name() {
        let article = Article {
            link: Some("https://a/1".to_string()),
            pub_date: Some("2024-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["pubDate"], "2024-01-01T00:00:00Z");
        assert!(json["title"].is_null());
        assert!(json.get("pub_date").is_none());
    }

    #[test]
    fn test_article_reads_older_records_without_extras() {
        let json = r#"{"title": "t", "link": "https://a/1", "description": null, "source_id": "s", "pubDate": "2024-01-01"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.dedup_key(), Some("https://a/1"));
        assert_eq!(article.fetched_at, None);
        assert_eq!(article.category, None);
    }

    #[test]
    fn test_dedup_key_rejects_empty_link() {
        let article = Article {
            link: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(article.dedup_key(), None);
    }
}
