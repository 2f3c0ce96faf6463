//! newsdata.io client.
//!
//! The run loop talks to the provider through the [`ArticleSource`] trait so it
//! can be driven by something other than the network. [`NewsDataClient`] is
//! the real implementation: one GET per topic, no pagination, no retries. A
//! timeout or error ends that topic's fetch for this run.
//!
//! # Request
//!
//! ```text
//! GET {endpoint}?apikey=...&q=...&language=en[&full_content=1]
//! ```
//!
//! `qInTitle` replaces `q` when [`QueryField::QInTitle`] is configured.

use crate::config::{Config, QueryField};
use crate::error::{ConfigError, FetchError};
use crate::models::{LatestResponse, RawArticle, Topic};
use crate::utils::truncate_for_log;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A source of provider articles for a topic.
pub trait ArticleSource {
    /// Fetch the current results for `topic`.
    async fn fetch(&self, topic: &Topic) -> Result<Vec<RawArticle>, FetchError>;
}

/// HTTP client for the newsdata.io `latest` endpoint.
pub struct NewsDataClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    language: String,
    query_field: QueryField,
    full_content: bool,
}

impl std::fmt::Debug for NewsDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsDataClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("language", &self.language)
            .field("query_field", &self.query_field)
            .field("full_content", &self.full_content)
            .finish_non_exhaustive()
    }
}

impl NewsDataClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            query_field: config.query_field,
            full_content: config.full_content,
        })
    }

    fn query_params<'a>(&'a self, topic: &'a Topic) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![
            ("apikey", self.api_key.as_str()),
            (self.query_field.param_name(), topic.query.as_str()),
            ("language", self.language.as_str()),
        ];
        if self.full_content {
            params.push(("full_content", "1"));
        }
        params
    }
}

impl ArticleSource for NewsDataClient {
    #[instrument(level = "info", skip_all, fields(topic = %topic.id))]
    async fn fetch(&self, topic: &Topic) -> Result<Vec<RawArticle>, FetchError> {
        let t0 = Instant::now();
        info!(query = %topic.query, "Fetching topic");

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&self.query_params(topic))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let elapsed = t0.elapsed();

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                body = %truncate_for_log(&body, 300),
                "Provider rejected request"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: LatestResponse = serde_json::from_str(&body).inspect_err(|e| {
            warn!(error = %e, body = %truncate_for_log(&body, 300), "Response is not valid JSON")
        })?;
        let results = parsed.results.unwrap_or_default();

        debug!(
            provider_status = parsed.status.as_deref().unwrap_or("unknown"),
            total_results = ?parsed.total_results,
            "Decoded provider response"
        );
        info!(
            count = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Fetched topic"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use std::time::Duration;

    fn client(extra: &[&str]) -> NewsDataClient {
        let mut args = vec!["topic_news", "--api-key", "secret"];
        args.extend_from_slice(extra);
        let config = Config::from_cli(Cli::parse_from(args)).unwrap();
        NewsDataClient::new(&config).unwrap()
    }

    #[test]
    fn test_query_params_default() {
        let client = client(&[]);
        let topic = Topic::new("ai", "AI", "artificial intelligence");
        assert_eq!(
            client.query_params(&topic),
            vec![
                ("apikey", "secret"),
                ("q", "artificial intelligence"),
                ("language", "en"),
            ]
        );
    }

    #[test]
    fn test_query_params_in_title_with_full_content() {
        let client = client(&["--query-field", "q-in-title", "--full-content", "--language", "fr"]);
        let topic = Topic::new("uap", "UAP", "UAP OR UFO");
        assert_eq!(
            client.query_params(&topic),
            vec![
                ("apikey", "secret"),
                ("qInTitle", "UAP OR UFO"),
                ("language", "fr"),
                ("full_content", "1"),
            ]
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = client(&[]);
        assert!(!format!("{client:?}").contains("secret"));
    }

    /// Serve one canned HTTP response on a loopback port; returns the endpoint URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/api/1/latest")
    }

    #[tokio::test]
    async fn test_fetch_returns_results() {
        let endpoint = serve_once(
            "200 OK",
            r#"{"status":"success","totalResults":2,"results":[{"title":"a","link":"https://a/1"},{"title":"b","link":"https://a/2"}]}"#,
        )
        .await;
        let client = client(&["--endpoint", &endpoint]);
        let results = client.fetch(&Topic::new("ai", "AI", "ai")).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].link.as_deref(), Some("https://a/2"));
    }

    #[tokio::test]
    async fn test_fetch_missing_results_is_empty() {
        let endpoint = serve_once("200 OK", r#"{"status":"success","totalResults":0}"#).await;
        let client = client(&["--endpoint", &endpoint]);
        let results = client.fetch(&Topic::new("ai", "AI", "ai")).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_carries_body() {
        let endpoint = serve_once(
            "422 Unprocessable Entity",
            r#"{"status":"error","results":{"message":"Query length cannot be greater than 100"}}"#,
        )
        .await;
        let client = client(&["--endpoint", &endpoint]);
        let err = client.fetch(&Topic::new("ai", "AI", "ai")).await.unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 422);
                assert!(body.contains("Query length"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_decode_error() {
        let endpoint = serve_once("200 OK", "<html>maintenance</html>").await;
        let client = client(&["--endpoint", &endpoint]);
        let err = client.fetch(&Topic::new("ai", "AI", "ai")).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_stalled_provider_times_out() {
        use tokio::net::TcpListener;

        // accept the connection but never answer
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/api/1/latest", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = client(&["--endpoint", &endpoint, "--timeout-secs", "1"]);
        let started = Instant::now();
        let err = client.fetch(&Topic::new("ai", "AI", "ai")).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(10));
        match err {
            FetchError::Transport(e) => assert!(e.is_timeout()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // nothing listens on port 9 of the loopback interface
        let client = client(&["--endpoint", "http://127.0.0.1:9/api/1/latest", "--timeout-secs", "2"]);
        let topic = Topic::new("ai", "AI", "ai");
        let err = client.fetch(&topic).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(!err.to_string().contains("secret"));
    }
}
