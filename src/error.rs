//! Error types for configuration, fetching, and storage.
//!
//! Each stage of the pipeline has its own error enum so the run loop can tell a
//! failed fetch apart from a fetch that succeeded but could not be persisted.
//! Reading prior history has no error type: an unreadable article set is logged
//! and treated as empty.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems, detected before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NEWSDATA_API_KEY is not set (pass --api-key or export the variable)")]
    MissingApiKey,

    #[error("invalid endpoint URL {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("cannot read topics file {path}: {source}")]
    TopicsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse topics file {path}: {source}")]
    TopicsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no topics configured")]
    NoTopics,

    #[error("topic id {0:?} must be non-empty and use only ASCII letters, digits, '-' or '_'")]
    InvalidTopicId(String),

    #[error("topic id {0:?} is configured more than once")]
    DuplicateTopicId(String),

    #[error("topic id {0:?} is reserved for the combined run snapshot")]
    ReservedTopicId(String),

    #[error("query for topic {0:?} is empty")]
    EmptyQuery(String),

    #[error("query for topic {id:?} is {len} characters long (provider limit is {max})")]
    QueryTooLong { id: String, len: usize, max: usize },

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("cannot build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// A failed request for one topic. Recoverable: other topics still run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // the request URL carries the API key as a query parameter
        FetchError::Transport(e.without_url())
    }
}

/// Failure to persist an article set or snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot serialize articles: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
