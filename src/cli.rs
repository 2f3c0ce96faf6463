//! Command-line interface definitions for topic_news.
//!
//! Every option has a default or an environment fallback, so the binary runs
//! with no arguments as long as `NEWSDATA_API_KEY` is exported.

use crate::merge::{EphemeralTopN, RollingMerge};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for topic_news.
///
/// # Examples
///
/// ```sh
/// # Rolling history into ./data (the default)
/// NEWSDATA_API_KEY=... topic_news
///
/// # Five fresh articles per topic, with audit snapshots
/// topic_news --strategy top-n --snapshot-dir ./data/history
///
/// # Custom topics
/// topic_news --topics topics.yaml -o /srv/site/data
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// newsdata.io API key
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory holding the per-topic JSON files
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "data")]
    pub output_dir: PathBuf,

    /// Directory for timestamped snapshot copies (disabled when unset)
    #[arg(long, env = "NEWS_SNAPSHOT_DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// YAML file replacing the built-in topic list
    #[arg(short, long, env = "NEWS_TOPICS_FILE")]
    pub topics: Option<PathBuf>,

    /// News search endpoint
    #[arg(long, env = "NEWSDATA_ENDPOINT", default_value = "https://newsdata.io/api/1/latest")]
    pub endpoint: String,

    /// Language code sent with every request
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Match the query against the whole article or only the title
    #[arg(long, value_enum, default_value_t = QueryFieldArg::Q)]
    pub query_field: QueryFieldArg,

    /// Ask the provider for full article content
    #[arg(long)]
    pub full_content: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout_secs: u64,

    /// How fetched articles combine with the stored files
    #[arg(long, value_enum, env = "NEWS_STRATEGY", default_value_t = StrategyArg::Rolling)]
    pub strategy: StrategyArg,

    /// Retention cap for the rolling strategy
    #[arg(long, default_value_t = RollingMerge::DEFAULT_MAX_ITEMS)]
    pub max_items: usize,

    /// Articles kept per topic by the top-n strategy
    #[arg(long, default_value_t = EphemeralTopN::DEFAULT_PER_TOPIC)]
    pub per_topic: usize,

    /// What to write for a topic whose fetch failed
    #[arg(long, value_enum, default_value_t = FailurePolicyArg::Skip)]
    pub on_fetch_failure: FailurePolicyArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum QueryFieldArg {
    /// `q`: title, description and content
    Q,
    /// `qInTitle`: title only
    QInTitle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Merge into stored history, dedup by link, keep the newest --max-items
    Rolling,
    /// Overwrite each topic with this run's first --per-topic unique links
    TopN,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicyArg {
    /// Leave the stored file untouched
    Skip,
    /// Overwrite the stored file with an empty list
    WriteEmpty,
}
