//! # topic_news
//!
//! Polls the newsdata.io `latest` endpoint once per configured topic and keeps
//! a deduplicated, capped JSON article set per topic on disk for a static
//! front end to load.
//!
//! ## Usage
//!
//! ```sh
//! NEWSDATA_API_KEY=... topic_news
//! topic_news -o ./data --snapshot-dir ./data/history --strategy top-n
//! ```
//!
//! ## Architecture
//!
//! Each topic goes through the same stages, strictly in sequence:
//! 1. **Fetch**: one GET against the provider ([`api`])
//! 2. **Normalize**: reduce provider items to the stored record ([`normalize`])
//! 3. **Merge**: combine with stored history per the strategy ([`merge`])
//! 4. **Persist**: atomically replace the topic file ([`outputs`])
//!
//! The binary is meant to be run by an external scheduler; it holds no state
//! between invocations beyond the files it writes.
//!
//! ## Exit status
//!
//! `0` when every topic was written, `1` when any topic failed or the
//! configuration is unusable.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod merge;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod utils;

use api::NewsDataClient;
use cli::Cli;
use config::Config;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "topic_news starting up");

    let args = Cli::parse();
    let config = match Config::from_cli(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration; nothing fetched");
            return Err(e.into());
        }
    };
    debug!(?config, "Resolved configuration");
    info!(
        topics = %config.topics.iter().map(|t| t.id.as_str()).join(","),
        strategy = ?config.strategy,
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    // Early check: output directories are writable
    for dir in std::iter::once(&config.output_dir).chain(config.snapshot_dir.as_ref()) {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    let client = NewsDataClient::new(&config)?;
    let mut strategy = config.strategy.build();
    let summary = pipeline::run(&config, &client, strategy.as_mut()).await;

    let elapsed = start_time.elapsed();
    let written = summary.outcomes.len() - summary.failed();
    info!(
        run = summary.stamp.as_str(),
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        written,
        failed = summary.failed(),
        "Execution complete"
    );

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!(
            failed_topics = %summary
                .outcomes
                .iter()
                .filter(|o| o.status != pipeline::TopicStatus::Written)
                .map(|o| format!("{}={}", o.topic, o.status))
                .join(","),
            "Some topics were not updated"
        );
        Ok(ExitCode::FAILURE)
    }
}
