//! Atomic file transfer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::dedup::PathLocks;
use crate::error::{Error, Result};
use crate::fs::ensure_dir;
use crate::media::{ResourceDescriptor, ResourceSource};
use crate::output::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Longest temporary file name that still carries the final name.
const MAX_TEMP_NAME_BYTES: usize = 255;

/// Result of writing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success(PathBuf),
    Duplicate(PathBuf),
    Failed(String),
}

/// Writes resources to their final path through a temporary sibling.
///
/// A final path either does not exist or holds a complete file: bytes go to
/// a `.part` file in the same directory which is renamed only after it is
/// fully written.
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    client: Client,
    locks: Arc<PathLocks>,
    show_progress: bool,
}

impl TransferExecutor {
    pub fn new(client: Client, locks: Arc<PathLocks>, show_progress: bool) -> Self {
        Self {
            client,
            locks,
            show_progress,
        }
    }

    /// Write `resource` to `destination`.
    pub async fn fetch(&self, resource: &ResourceDescriptor, destination: &Path) -> TransferOutcome {
        match self.transfer(resource, destination).await {
            Ok(path) => TransferOutcome::Success(path),
            Err(Error::FileAlreadyExists(path)) => TransferOutcome::Duplicate(path),
            Err(e) => {
                tracing::debug!("Transfer to {} failed: {}", destination.display(), e);
                TransferOutcome::Failed(e.to_string())
            }
        }
    }

    async fn transfer(&self, resource: &ResourceDescriptor, destination: &Path) -> Result<PathBuf> {
        let dir = destination.parent().ok_or_else(|| {
            Error::Transfer(format!("{} has no parent directory", destination.display()))
        })?;
        ensure_dir(dir).await?;

        if tokio::fs::try_exists(destination).await? {
            return Err(Error::FileAlreadyExists(destination.to_path_buf()));
        }

        let temp = dir.join(temp_name(destination));
        let result = self.write_and_commit(resource, &temp, destination).await;

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&temp).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Could not remove {}: {}", temp.display(), e);
                }
            }
        }

        result.map(|()| destination.to_path_buf())
    }

    async fn write_and_commit(
        &self,
        resource: &ResourceDescriptor,
        temp: &Path,
        destination: &Path,
    ) -> Result<()> {
        match &resource.source {
            ResourceSource::Remote(url) => self.download(url, temp).await?,
            ResourceSource::Inline(text) => {
                let mut file = File::create(temp).await?;
                file.write_all(text.as_bytes()).await?;
                file.flush().await?;
            }
        }

        let _guard = self.locks.lock(destination).await;
        if tokio::fs::try_exists(destination).await? {
            return Err(Error::FileAlreadyExists(destination.to_path_buf()));
        }
        tokio::fs::rename(temp, destination).await?;

        Ok(())
    }

    /// Stream `url` into `output_path`.
    async fn download(&self, url: &str, output_path: &Path) -> Result<()> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transfer(format!("HTTP {} for {}", status, url)));
        }

        let content_length = response.content_length();
        let show_progress =
            self.show_progress && content_length.map(|l| l > PROGRESS_THRESHOLD).unwrap_or(false);

        let progress = show_progress.then(|| create_download_bar(content_length.unwrap_or(0)));

        // Stream to file
        let mut file = File::create(output_path).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Transfer(format!("Stream error: {}", e)))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(downloaded);
            }
        }

        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        Ok(())
    }
}

/// Hidden, unique temporary name next to `destination`.
fn temp_name(destination: &Path) -> String {
    let id = Uuid::new_v4();
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let full = format!(".{}.{}.part", name, id);
    if full.len() <= MAX_TEMP_NAME_BYTES {
        full
    } else {
        format!(".{}.part", id)
    }
}
