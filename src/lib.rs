//! reddit-media-dl - batch downloader for media linked from reddit posts
//!
//! This library turns a list of posts into files on disk.
//!
//! # Features
//!
//! - Imgur images, albums and galleries through the metered API
//! - Redgifs items and galleries with rendition fallback
//! - Gfycat pages, direct file links and self posts rendered as Markdown
//! - Filename-based deduplication across runs
//! - Per-host rate limiting and quota checks
//! - A replayable JSON log of every failed post
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use reddit_media_dl::{ledger, BatchDownloader, Config, FailureLedger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?.run_config();
//!     let posts = ledger::load_as_post_sequence(Path::new("posts.json"))?;
//!
//!     let log = ledger::ledger_path(&config.download_directory, chrono::Utc::now());
//!     let downloader = BatchDownloader::from_config(&config, FailureLedger::create(log, "example").await?)?;
//!     let summary = downloader.run_batch(posts).await?;
//!
//!     println!("{} downloaded, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod fs;
pub mod ledger;
pub mod limit;
pub mod media;
pub mod output;
pub mod resolve;

// Re-exports for convenience
pub use config::{Config, RunConfig};
pub use download::{BatchDownloader, BatchSummary};
pub use error::{Error, Result};
pub use ledger::FailureLedger;
pub use media::{classify, HostType, PostDescriptor, ResourceDescriptor};
pub use resolve::Resolver;
