//! The per-topic run loop: fetch → normalize → merge → persist.
//!
//! Topics are processed one after another. Whatever goes wrong with one topic
//! is recorded in its [`TopicOutcome`] and the loop moves on; only the caller
//! decides what a failed topic means for the process exit status.

use crate::api::ArticleSource;
use crate::config::{Config, FailurePolicy};
use crate::merge::PersistenceStrategy;
use crate::models::{Article, Topic};
use crate::normalize::normalize_all;
use crate::outputs::json::{read_article_set, write_article_set};
use crate::outputs::snapshots::{RunStamp, write_run_snapshot, write_topic_snapshot};
use crate::utils::utc_timestamp;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    /// The topic's article set was persisted.
    Written,
    /// The provider call failed; the failure policy decided what (if anything) was written.
    FetchFailed,
    /// Articles were fetched but could not be persisted.
    WriteFailed,
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopicStatus::Written => "written",
            TopicStatus::FetchFailed => "fetch_failed",
            TopicStatus::WriteFailed => "write_failed",
        })
    }
}

#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub topic: String,
    pub status: TopicStatus,
    /// Articles returned by the provider.
    pub fetched: usize,
    /// Length of the persisted set, when one was written.
    pub stored: Option<usize>,
    pub elapsed: Duration,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stamp: RunStamp,
    pub outcomes: Vec<TopicOutcome>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status != TopicStatus::Written)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Values shared by every topic of one run.
struct RunContext<'a> {
    config: &'a Config,
    stamp: RunStamp,
    fetched_at: String,
}

/// Process every configured topic with `strategy`.
#[instrument(level = "info", skip_all, fields(strategy = strategy.name(), topics = config.topics.len()))]
pub async fn run<S: ArticleSource>(
    config: &Config,
    source: &S,
    strategy: &mut dyn PersistenceStrategy,
) -> RunSummary {
    let ctx = RunContext {
        config,
        stamp: RunStamp::now(),
        fetched_at: utc_timestamp(),
    };

    let mut outcomes = Vec::with_capacity(config.topics.len());
    let mut run_articles = Vec::new();

    for topic in &config.topics {
        let (outcome, fresh) = run_topic(&ctx, topic, source, strategy).await;
        log_outcome(&outcome);
        outcomes.push(outcome);
        if config.snapshot_dir.is_some() {
            run_articles.extend(fresh);
        }
    }

    if let Some(dir) = &config.snapshot_dir {
        match write_run_snapshot(dir, &ctx.stamp, &run_articles).await {
            Ok(path) => info!(path = %path.display(), count = run_articles.len(), "Wrote run snapshot"),
            Err(e) => warn!(error = %e, "Failed to write run snapshot"),
        }
    }

    RunSummary {
        stamp: ctx.stamp,
        outcomes,
    }
}

/// Run one topic; also hands back the freshly normalized articles for the run snapshot.
#[instrument(level = "info", skip_all, fields(topic = %topic.id))]
async fn run_topic<S: ArticleSource>(
    ctx: &RunContext<'_>,
    topic: &Topic,
    source: &S,
    strategy: &mut dyn PersistenceStrategy,
) -> (TopicOutcome, Vec<Article>) {
    let t0 = Instant::now();
    let path = ctx.config.topic_path(topic);

    let raw = match source.fetch(topic).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(name = %topic.name, error = %e, "Fetch failed");
            let stored = match ctx.config.failure_policy {
                FailurePolicy::Skip => None,
                FailurePolicy::WriteEmpty => match write_article_set(&path, &[]).await {
                    Ok(()) => Some(0),
                    Err(we) => {
                        error!(error = %we, "Failed to clear article set after fetch failure");
                        None
                    }
                },
            };
            let outcome = TopicOutcome {
                topic: topic.id.clone(),
                status: TopicStatus::FetchFailed,
                fetched: 0,
                stored,
                elapsed: t0.elapsed(),
                error: Some(e.to_string()),
            };
            return (outcome, Vec::new());
        }
    };

    let fresh = normalize_all(raw, &ctx.fetched_at);
    let fetched = fresh.len();

    if let Some(dir) = &ctx.config.snapshot_dir {
        if let Err(e) = write_topic_snapshot(dir, topic, &ctx.stamp, &fresh).await {
            warn!(error = %e, "Failed to write topic snapshot");
        }
    }

    let existing = if strategy.reads_history() {
        read_article_set(&path).await
    } else {
        Vec::new()
    };
    let keep_for_snapshot = if ctx.config.snapshot_dir.is_some() {
        fresh.clone()
    } else {
        Vec::new()
    };
    let merged = strategy.merge(existing, fresh);

    let outcome = match write_article_set(&path, &merged).await {
        Ok(()) => TopicOutcome {
            topic: topic.id.clone(),
            status: TopicStatus::Written,
            fetched,
            stored: Some(merged.len()),
            elapsed: t0.elapsed(),
            error: None,
        },
        Err(e) => {
            error!(error = %e, "Fetched articles could not be persisted");
            TopicOutcome {
                topic: topic.id.clone(),
                status: TopicStatus::WriteFailed,
                fetched,
                stored: None,
                elapsed: t0.elapsed(),
                error: Some(e.to_string()),
            }
        }
    };
    (outcome, keep_for_snapshot)
}

fn log_outcome(outcome: &TopicOutcome) {
    let elapsed_ms = outcome.elapsed.as_millis() as u64;
    match outcome.status {
        TopicStatus::Written => info!(
            topic = %outcome.topic,
            outcome = %outcome.status,
            fetched = outcome.fetched,
            stored = outcome.stored.unwrap_or_default(),
            elapsed_ms,
            "Topic done"
        ),
        _ => warn!(
            topic = %outcome.topic,
            outcome = %outcome.status,
            fetched = outcome.fetched,
            stored = ?outcome.stored,
            elapsed_ms,
            error = outcome.error.as_deref().unwrap_or(""),
            "Topic failed"
        ),
    }
}
