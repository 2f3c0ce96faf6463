//! Per-topic article set files.
//!
//! Each topic owns one pretty-printed JSON array at `<output_dir>/<id>.json`.
//! Files are replaced wholesale: the new content is written to a `.tmp`
//! sibling first and renamed over the target, so a reader sees either the old
//! set or the new one.
//!
//! Reading never fails. A missing file, a file that is not JSON, or JSON whose
//! top level is not an array all mean "no history".

use crate::error::StorageError;
use crate::models::Article;
use serde_json::Value;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Load a stored article set, treating anything unusable as empty.
///
/// Array elements that are not JSON objects are skipped.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn read_article_set(path: &Path) -> Vec<Article> {
    let raw = match fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No stored article set yet");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "Stored article set is unreadable; starting from empty history");
            return Vec::new();
        }
    };

    let items = match serde_json::from_slice::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            warn!(
                found = json_type(&other),
                "Stored article set is not a JSON array; starting from empty history"
            );
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "Stored article set is not valid JSON; starting from empty history");
            return Vec::new();
        }
    };

    let total = items.len();
    let articles: Vec<Article> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if articles.len() != total {
        warn!(
            skipped = total - articles.len(),
            "Ignored non-object entries in stored article set"
        );
    }
    debug!(count = articles.len(), "Loaded stored article set");
    articles
}

/// Replace the file at `path` with `articles` as a pretty-printed JSON array.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_article_set(path: &Path, articles: &[Article]) -> Result<(), StorageError> {
    let mut json = serde_json::to_vec_pretty(articles)?;
    json.push(b'\n');

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| StorageError::io(dir, e))?;
    }

    let tmp = tmp_path(path);
    if let Err(e) = fs::write(&tmp, &json).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(StorageError::io(&tmp, e));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(StorageError::io(path, e));
    }

    info!(bytes = json.len(), "Wrote article set");
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("articles.json"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
