//! Run configuration.
//!
//! [`Config`] is built once in `main` from the parsed [`Cli`] (plus the optional
//! topics file) and handed by reference to every stage. Everything that can be
//! wrong with it is reported here, before the first request goes out.

use crate::cli::{Cli, FailurePolicyArg, QueryFieldArg, StrategyArg};
use crate::error::ConfigError;
use crate::merge::{EphemeralTopN, PersistenceStrategy, RollingMerge};
use crate::models::{Topic, default_topics};
use crate::outputs::snapshots::RUN_SNAPSHOT_PREFIX;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Longest query the provider accepts; longer ones fail with HTTP 422.
pub const MAX_QUERY_LEN: usize = 100;

/// Which query parameter carries the topic query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryField {
    Q,
    QInTitle,
}

impl QueryField {
    pub fn param_name(self) -> &'static str {
        match self {
            QueryField::Q => "q",
            QueryField::QInTitle => "qInTitle",
        }
    }
}

/// Selected persistence strategy and its limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Rolling { max_items: usize },
    TopN { per_topic: usize },
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn PersistenceStrategy> {
        match self {
            StrategyKind::Rolling { max_items } => Box::new(RollingMerge::new(max_items)),
            StrategyKind::TopN { per_topic } => Box::new(EphemeralTopN::new(per_topic)),
        }
    }
}

/// What happens to a topic's stored file when its fetch fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep whatever is on disk.
    Skip,
    /// Replace the file with `[]`.
    WriteEmpty,
}

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub endpoint: Url,
    pub language: String,
    pub query_field: QueryField,
    pub full_content: bool,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    pub snapshot_dir: Option<PathBuf>,
    pub strategy: StrategyKind,
    pub failure_policy: FailurePolicy,
    pub topics: Vec<Topic>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("language", &self.language)
            .field("query_field", &self.query_field)
            .field("full_content", &self.full_content)
            .field("timeout", &self.timeout)
            .field("output_dir", &self.output_dir)
            .field("snapshot_dir", &self.snapshot_dir)
            .field("strategy", &self.strategy)
            .field("failure_policy", &self.failure_policy)
            .field("topics", &self.topics)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TopicsFile {
    topics: Vec<Topic>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let api_key = cli
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let endpoint = Url::parse(&cli.endpoint).map_err(|source| ConfigError::InvalidEndpoint {
            url: cli.endpoint.clone(),
            source,
        })?;

        let topics = match &cli.topics {
            Some(path) => load_topics(path)?,
            None => default_topics(),
        };
        validate_topics(&topics)?;

        if cli.timeout_secs == 0 {
            return Err(ConfigError::ZeroLimit("--timeout-secs"));
        }

        let strategy = match cli.strategy {
            StrategyArg::Rolling => StrategyKind::Rolling {
                max_items: nonzero(cli.max_items, "--max-items")?,
            },
            StrategyArg::TopN => StrategyKind::TopN {
                per_topic: nonzero(cli.per_topic, "--per-topic")?,
            },
        };

        Ok(Self {
            api_key,
            endpoint,
            language: cli.language,
            query_field: match cli.query_field {
                QueryFieldArg::Q => QueryField::Q,
                QueryFieldArg::QInTitle => QueryField::QInTitle,
            },
            full_content: cli.full_content,
            timeout: Duration::from_secs(cli.timeout_secs),
            output_dir: cli.output_dir,
            snapshot_dir: cli.snapshot_dir,
            strategy,
            failure_policy: match cli.on_fetch_failure {
                FailurePolicyArg::Skip => FailurePolicy::Skip,
                FailurePolicyArg::WriteEmpty => FailurePolicy::WriteEmpty,
            },
            topics,
        })
    }

    /// Path of the stored article set for `topic`.
    pub fn topic_path(&self, topic: &Topic) -> PathBuf {
        self.output_dir.join(topic.file_name())
    }
}

fn nonzero(value: usize, flag: &'static str) -> Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroLimit(flag))
    } else {
        Ok(value)
    }
}

fn load_topics(path: &Path) -> Result<Vec<Topic>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::TopicsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: TopicsFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::TopicsParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.topics)
}

/// Topic ids become file names, so they are restricted to a safe alphabet and
/// must not collide with the run snapshot.
fn validate_topics(topics: &[Topic]) -> Result<(), ConfigError> {
    if topics.is_empty() {
        return Err(ConfigError::NoTopics);
    }

    let mut ids = HashSet::new();
    for topic in topics {
        let id_ok = !topic.id.is_empty()
            && topic
                .id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !id_ok {
            return Err(ConfigError::InvalidTopicId(topic.id.clone()));
        }
        if topic.id == RUN_SNAPSHOT_PREFIX {
            return Err(ConfigError::ReservedTopicId(topic.id.clone()));
        }
        if !ids.insert(topic.id.as_str()) {
            return Err(ConfigError::DuplicateTopicId(topic.id.clone()));
        }

        if topic.query.trim().is_empty() {
            return Err(ConfigError::EmptyQuery(topic.id.clone()));
        }
        let len = topic.query.chars().count();
        if len > MAX_QUERY_LEN {
            return Err(ConfigError::QueryTooLong {
                id: topic.id.clone(),
                len,
                max: MAX_QUERY_LEN,
            });
        }
    }
    Ok(())
}
