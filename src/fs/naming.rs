//! Filename sanitization.

use crate::error::{Error, Result};

/// Titles longer than this (in characters) are cut before sanitizing.
const MAX_TITLE_CHARS: usize = 200;

/// Turn a post title into something usable as part of a filename.
///
/// Spaces become underscores, line breaks are dropped, and characters that are
/// invalid on common filesystems (plus `.`) are replaced with `_`. The same
/// title always yields the same output, which the duplicate check relies on.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .take(MAX_TITLE_CHARS)
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            ' ' => '_',
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

/// Sanitize a path component (folder name) with less strict validation.
///
/// This is used for subreddit names where we want to sanitize rather than
/// reject on certain characters.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}
