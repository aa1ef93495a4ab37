//! Error types for the reddit-media-dl application.

use std::path::PathBuf;

use thiserror::Error;

use crate::limit::QuotaWindow;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Host API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{window} LIMIT EXCEEDED (resets {reset})")]
    QuotaExceeded { window: QuotaWindow, reset: String },

    // Resolution errors
    #[error("Could not resolve link: {0}")]
    Resolution(String),

    #[error("Not a downloadable link: {0}")]
    NotDownloadable(String),

    // Transfer errors
    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("File already exists: {}", .0.display())]
    FileAlreadyExists(PathBuf),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // Failure log errors
    #[error("Log file error: {0}")]
    Ledger(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Whether this error must stop the whole batch rather than the current item.
    ///
    /// Only a rejected credential at the quota-bearing host qualifies: every later
    /// call to that host would fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }

    /// Whether a retry of the same idempotent request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Api(_) => true,
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORTED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 3;
    pub const INPUT_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_authentication_is_fatal() {
        assert!(Error::Authentication("HTTP 403".into()).is_fatal());
        assert!(!Error::Resolution("gone".into()).is_fatal());
        assert!(!Error::Transfer("reset".into()).is_fatal());
    }

    #[test]
    fn test_quota_message_names_window() {
        let err = Error::QuotaExceeded {
            window: QuotaWindow::Short,
            reset: "after 3 Minutes 4 Seconds".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("USER LIMIT EXCEEDED"));
        assert!(text.contains("after 3 Minutes 4 Seconds"));
    }
}
