//! Destination path derivation.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::{sanitize_path_component, sanitize_title};
use crate::media::{PostDescriptor, ResourceDescriptor};

/// Extensions probed when checking whether a post was already downloaded.
pub const KNOWN_EXTENSIONS: [&str; 6] = ["jpg", "png", "mp4", "gif", "webm", "md"];

/// Longest file name (in bytes) most filesystems accept.
const MAX_FILENAME_BYTES: usize = 255;

/// Directory a post's files are written to: `{root}/{subreddit}`.
pub fn post_directory(root: &Path, post: &PostDescriptor) -> Result<PathBuf> {
    Ok(root.join(sanitize_path_component(&post.subreddit)?))
}

/// Primary file stem: `{sanitized-title}_{id}`, or just the id for empty titles.
fn title_stem(post: &PostDescriptor) -> String {
    let title = sanitize_title(&post.title);
    if title.is_empty() {
        post.id.clone()
    } else {
        format!("{}_{}", title, post.id)
    }
}

fn file_name(stem: &str, ordinal: Option<u32>, extension: &str) -> String {
    match ordinal {
        Some(n) => format!("{}_{}.{}", stem, n, extension),
        None => format!("{}.{}", stem, extension),
    }
}

/// Every path under which a finished download of `post` could exist.
///
/// Title convention first, then the id-only fallback, each across
/// `KNOWN_EXTENSIONS`.
pub fn candidate_paths(root: &Path, post: &PostDescriptor) -> Result<Vec<PathBuf>> {
    let dir = post_directory(root, post)?;
    let stems = [title_stem(post), post.id.clone()];

    Ok(stems
        .iter()
        .flat_map(|stem| {
            KNOWN_EXTENSIONS
                .iter()
                .map(|ext| dir.join(file_name(stem, None, ext)))
        })
        .collect())
}

/// Final path for one resource of a post.
///
/// Uses `{title}_{id}.{ext}`; falls back to `{id}.{ext}` when the title form
/// would exceed the filename length limit. Multi-file posts get `_{ordinal}`
/// appended to the stem.
pub fn destination_path(
    root: &Path,
    post: &PostDescriptor,
    resource: &ResourceDescriptor,
) -> Result<PathBuf> {
    let dir = post_directory(root, post)?;

    let primary = file_name(&title_stem(post), resource.ordinal, &resource.extension);
    if primary.len() <= MAX_FILENAME_BYTES {
        return Ok(dir.join(primary));
    }

    Ok(dir.join(file_name(&post.id, resource.ordinal, &resource.extension)))
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tokio::fs::create_dir_all(path).await?;
    }
    Ok(())
}
