//! Persistence strategies: how a run's articles combine with stored history.
//!
//! Two policies are available and a deployment picks exactly one:
//!
//! | Strategy | History | Dedup scope | Cap |
//! |----------|---------|-------------|-----|
//! | [`RollingMerge`] | read and merged | stored set + this fetch | retention cap (200) |
//! | [`EphemeralTopN`] | ignored, overwritten | all topics of this run | per-topic N (5) |
//!
//! Both produce a set ordered by `pubDate` descending using plain string
//! comparison. Articles without a `pubDate` sort last. Articles without a
//! usable link are never kept.

use crate::models::Article;
use std::collections::HashSet;
use tracing::debug;

/// Combines stored and fresh articles into the set persisted for a topic.
pub trait PersistenceStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether [`PersistenceStrategy::merge`] needs the stored article set.
    fn reads_history(&self) -> bool;

    /// Produce the article set to write for one topic.
    ///
    /// `existing` is empty when the strategy does not read history or no
    /// usable history exists.
    fn merge(&mut self, existing: Vec<Article>, fresh: Vec<Article>) -> Vec<Article>;
}

/// Accumulating history bounded by a retention cap.
#[derive(Debug, Clone)]
pub struct RollingMerge {
    max_items: usize,
}

impl RollingMerge {
    pub const DEFAULT_MAX_ITEMS: usize = 200;

    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }
}

impl PersistenceStrategy for RollingMerge {
    fn name(&self) -> &'static str {
        "rolling"
    }

    fn reads_history(&self) -> bool {
        true
    }

    fn merge(&mut self, existing: Vec<Article>, fresh: Vec<Article>) -> Vec<Article> {
        let existing_len = existing.len();
        let fresh_len = fresh.len();

        let mut seen: HashSet<String> = HashSet::with_capacity(existing_len + fresh_len);
        let mut merged = Vec::with_capacity(existing_len + fresh_len);
        for article in existing.into_iter().chain(fresh) {
            let Some(key) = article.dedup_key() else {
                continue;
            };
            if seen.insert(key.to_string()) {
                merged.push(article);
            }
        }

        sort_newest_first(&mut merged);
        let before_cap = merged.len();
        merged.truncate(self.max_items);

        debug!(
            existing = existing_len,
            fresh = fresh_len,
            unique = before_cap,
            kept = merged.len(),
            cap = self.max_items,
            "Merged article set"
        );
        merged
    }
}

/// Each run replaces the stored set with its own top picks.
///
/// The used-links set spans every topic of the run, so an article matching two
/// topics is stored only under the first one processed.
#[derive(Debug, Clone)]
pub struct EphemeralTopN {
    per_topic: usize,
    used_links: HashSet<String>,
}

impl EphemeralTopN {
    pub const DEFAULT_PER_TOPIC: usize = 5;

    pub fn new(per_topic: usize) -> Self {
        Self {
            per_topic,
            used_links: HashSet::new(),
        }
    }
}

impl PersistenceStrategy for EphemeralTopN {
    fn name(&self) -> &'static str {
        "top-n"
    }

    fn reads_history(&self) -> bool {
        false
    }

    fn merge(&mut self, _existing: Vec<Article>, fresh: Vec<Article>) -> Vec<Article> {
        let fresh_len = fresh.len();
        let mut picked = Vec::with_capacity(self.per_topic);
        for article in fresh {
            if picked.len() == self.per_topic {
                break;
            }
            let Some(key) = article.dedup_key() else {
                continue;
            };
            if self.used_links.insert(key.to_string()) {
                picked.push(article);
            }
        }

        sort_newest_first(&mut picked);
        debug!(
            fresh = fresh_len,
            kept = picked.len(),
            used_this_run = self.used_links.len(),
            "Selected top articles"
        );
        picked
    }
}

/// Stable sort by `pubDate` descending, lexical; `None` is the smallest value.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
}
