//! Mapping from provider articles to the persisted record.

use crate::models::{Article, RawArticle};

/// Reduce one provider article to an [`Article`], stamping it with `fetched_at`.
pub fn normalize(raw: RawArticle, fetched_at: &str) -> Article {
    Article {
        title: raw.title,
        link: raw.link,
        description: raw.description,
        source_id: raw.source_id,
        pub_date: raw.pub_date,
        category: raw.category,
        image_url: raw.image_url,
        fetched_at: Some(fetched_at.to_string()),
    }
}

/// Normalize a whole result list, preserving provider order.
pub fn normalize_all(raw: Vec<RawArticle>, fetched_at: &str) -> Vec<Article> {
    raw.into_iter().map(|r| normalize(r, fetched_at)).collect()
}
