//! Failure ledger: a JSON record of every post that failed in a run.
//!
//! The file doubles as input for a later run, so failed posts can be retried
//! by pointing the downloader at the ledger.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::media::PostDescriptor;

/// Reserved key holding run information; never a post.
pub const HEADER_KEY: &str = "HEADER";

/// Where the ledger of a run started at `started_at` lives.
pub fn ledger_path(root: &Path, started_at: DateTime<Utc>) -> PathBuf {
    root.join("LOG_FILES")
        .join(started_at.format("%Y-%m-%d_%H-%M-%S").to_string())
        .join("FAILED.json")
}

/// Append-only map of batch index to `(reason, post)`.
#[derive(Debug)]
pub struct FailureLedger {
    path: PathBuf,
    header: String,
    entries: Mutex<BTreeMap<usize, (String, PostDescriptor)>>,
}

impl FailureLedger {
    /// Start an empty ledger at `path`, writing the header immediately.
    pub async fn create(path: impl Into<PathBuf>, header: impl Into<String>) -> Result<Self> {
        let ledger = Self {
            path: path.into(),
            header: header.into(),
            entries: Mutex::new(BTreeMap::new()),
        };

        let entries = ledger.entries.lock().await;
        ledger.write(&entries).await?;
        drop(entries);

        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a failure of the post at 1-based `index` and flush to disk.
    pub async fn add(&self, index: usize, reason: impl Into<String>, post: &PostDescriptor) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(index, (reason.into(), post.clone()));
        self.write(&entries).await
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Rewrite the whole file through a temporary sibling and a rename.
    async fn write(&self, entries: &BTreeMap<usize, (String, PostDescriptor)>) -> Result<()> {
        let mut doc = Map::new();
        doc.insert(HEADER_KEY.to_string(), Value::String(self.header.clone()));
        for (index, (reason, post)) in entries {
            doc.insert(
                index.to_string(),
                Value::Array(vec![Value::String(reason.clone()), serde_json::to_value(post)?]),
            );
        }

        let content = serde_json::to_string_pretty(&Value::Object(doc))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        Ok(())
    }
}

/// Read a ledger (or listing snapshot) back as an ordered post sequence.
///
/// Entries are ordered by numeric key. An entry is either `[reason, post]`
/// (the last element is taken) or a bare post object. Posts without a host
/// type are dropped.
pub fn load_as_post_sequence(path: &Path) -> Result<Vec<PostDescriptor>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Ledger(format!("cannot read {}: {}", path.display(), e)))?;

    let doc: Value = serde_json::from_str(&content)
        .map_err(|e| Error::Ledger(format!("{} is not valid JSON: {}", path.display(), e)))?;

    let Value::Object(map) = doc else {
        return Err(Error::Ledger(format!(
            "{} must contain a JSON object",
            path.display()
        )));
    };

    let mut numbered: Vec<(u64, Value)> = Vec::with_capacity(map.len());
    for (key, value) in map {
        if key == HEADER_KEY {
            continue;
        }
        match key.parse::<u64>() {
            Ok(index) => numbered.push((index, value)),
            Err(_) => tracing::warn!("Skipping non-numeric log key '{}'", key),
        }
    }
    numbered.sort_by_key(|(index, _)| *index);

    let mut posts = Vec::with_capacity(numbered.len());
    for (index, value) in numbered {
        let record = match value {
            Value::Array(mut items) => match items.pop() {
                Some(last) => last,
                None => continue,
            },
            other => other,
        };

        match serde_json::from_value::<PostDescriptor>(record) {
            Ok(post) if post.host_type.is_some() => posts.push(post),
            Ok(_) => tracing::debug!("Entry {} has no post type, skipping", index),
            Err(e) => tracing::warn!("Entry {} is not a post: {}", index, e),
        }
    }

    Ok(posts)
}
