//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// reddit-media-dl CLI.
#[derive(Parser, Debug)]
#[command(
    name = "reddit-media-dl",
    version,
    about = "Download the media linked from reddit posts",
    long_about = "A CLI tool to download images, videos and text from a list of reddit posts.\n\n\
                  Supports Imgur, Gfycat, Redgifs, direct links and self posts. Failed posts are \
                  written to a log file that can be passed back in with --log to retry them."
)]
pub struct Args {
    /// Post list or failure log (JSON) to download from.
    #[arg(short, long)]
    pub log: PathBuf,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Imgur application client id.
    #[arg(long = "imgur-client-id", env = "IMGUR_CLIENT_ID")]
    pub imgur_client_id: Option<String>,

    /// Fixed Redgifs bearer token instead of a temporary one.
    #[arg(long = "redgifs-token", env = "REDGIFS_TOKEN", hide_env_values = true)]
    pub redgifs_token: Option<String>,

    /// Number of posts processed at once.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Hide per-post results and progress bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(client_id) = &self.imgur_client_id {
            config.imgur.client_id = client_id.clone();
        }

        if let Some(token) = &self.redgifs_token {
            config.redgifs.token = Some(token.clone());
        }

        if let Some(workers) = self.workers {
            config.options.workers = workers;
        }

        // Boolean flags (only override if set to non-default)
        if self.quiet {
            config.options.show_downloads = false;
        }
    }

    /// Command line echoed into the failure log header.
    pub fn describe(&self) -> String {
        let mut parts = vec![format!("--log {}", self.log.display())];
        if let Some(dir) = &self.download_directory {
            parts.push(format!("--directory {}", dir.display()));
        }
        if let Some(workers) = self.workers {
            parts.push(format!("--workers {}", workers));
        }
        parts.join(" ")
    }
}
