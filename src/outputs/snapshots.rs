//! Timestamped audit copies of what each run fetched.
//!
//! Snapshots are write-only from this program's point of view: nothing reads
//! them back and nothing prunes them. All files of one run share the same
//! [`RunStamp`] so they can be matched up later.
//!
//! ```text
//! snapshot_dir/
//! ├── ai_2025-05-06_08-00-01.json
//! ├── prehistory_2025-05-06_08-00-01.json
//! ├── uap_2025-05-06_08-00-01.json
//! └── news_2025-05-06_08-00-01.json   # every topic combined
//! ```

use crate::error::StorageError;
use crate::models::{Article, Topic};
use crate::outputs::json::write_article_set;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Timestamp shared by every snapshot file of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp(String);

impl RunStamp {
    pub fn now() -> Self {
        Self::from_datetime(Local::now())
    }

    pub fn from_datetime(at: DateTime<Local>) -> Self {
        Self(at.format("%Y-%m-%d_%H-%M-%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// File prefix of the combined run snapshot; no topic may use it as its id.
pub const RUN_SNAPSHOT_PREFIX: &str = "news";

pub fn topic_snapshot_path(dir: &Path, topic: &Topic, stamp: &RunStamp) -> PathBuf {
    dir.join(format!("{}_{}.json", topic.id, stamp.as_str()))
}

pub fn run_snapshot_path(dir: &Path, stamp: &RunStamp) -> PathBuf {
    dir.join(format!("{RUN_SNAPSHOT_PREFIX}_{}.json", stamp.as_str()))
}

/// Write the freshly normalized articles of one topic.
#[instrument(level = "info", skip_all, fields(topic = %topic.id))]
pub async fn write_topic_snapshot(
    dir: &Path,
    topic: &Topic,
    stamp: &RunStamp,
    articles: &[Article],
) -> Result<PathBuf, StorageError> {
    let path = topic_snapshot_path(dir, topic, stamp);
    write_article_set(&path, articles).await?;
    Ok(path)
}

/// Write every article fetched during the run, across topics.
#[instrument(level = "info", skip_all)]
pub async fn write_run_snapshot(
    dir: &Path,
    stamp: &RunStamp,
    articles: &[Article],
) -> Result<PathBuf, StorageError> {
    let path = run_snapshot_path(dir, stamp);
    write_article_set(&path, articles).await?;
    Ok(path)
}
