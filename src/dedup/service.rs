//! Existence checks for already downloaded posts.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::candidate_paths;
use crate::media::PostDescriptor;

/// Checks whether a post already has a file on disk.
///
/// Stateless; the filesystem is the only record of what has been downloaded.
#[derive(Debug)]
pub struct DedupService {
    root: PathBuf,
}

impl DedupService {
    /// Create a service rooted at the download directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First existing file for `post`, if any.
    pub async fn exists(&self, post: &PostDescriptor) -> Result<Option<PathBuf>> {
        let found = find_existing(&self.root, post).await?;
        if let Some(path) = &found {
            tracing::debug!("{} already downloaded as {}", post.id, path.display());
        }
        Ok(found)
    }
}

/// Probe every candidate path of `post` under `root`, first match wins.
pub async fn find_existing(root: &Path, post: &PostDescriptor) -> Result<Option<PathBuf>> {
    for path in candidate_paths(root, post)? {
        if tokio::fs::try_exists(&path).await? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> PostDescriptor {
        PostDescriptor::new("abc123", "pics", "A nice view", "https://i.redd.it/x.jpg")
    }

    #[tokio::test]
    async fn test_missing_post() {
        let dir = tempfile::tempdir().unwrap();
        let dedup = DedupService::new(dir.path());

        assert!(dedup.exists(&post()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_title_convention_found() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("pics");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("A_nice_view_abc123.webm"), b"x").unwrap();

        let dedup = DedupService::new(dir.path());
        let found = dedup.exists(&post()).await.unwrap();

        assert_eq!(found, Some(sub.join("A_nice_view_abc123.webm")));
    }

    #[tokio::test]
    async fn test_id_fallback_found() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("pics");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("abc123.md"), b"x").unwrap();

        let found = find_existing(dir.path(), &post()).await.unwrap();
        assert_eq!(found, Some(sub.join("abc123.md")));
    }

    #[tokio::test]
    async fn test_other_extensions_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("pics");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(sub.join("abc123.txt"), b"x").unwrap();

        assert!(find_existing(dir.path(), &post()).await.unwrap().is_none());
    }
}
