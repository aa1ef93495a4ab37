//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::run::{GfycatSettings, ImgurSettings, RedgifsSettings, RunConfig};
use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub imgur: ImgurConfig,

    #[serde(default)]
    pub redgifs: RedgifsConfig,

    #[serde(default)]
    pub gfycat: GfycatConfig,
}

/// General download options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Root directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Number of posts processed at once.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to show per-item progress and transfer bars.
    #[serde(default = "default_true")]
    pub show_downloads: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            workers: default_workers(),
            user_agent: default_user_agent(),
            show_downloads: true,
        }
    }
}

/// Imgur credentials and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImgurConfig {
    /// Application client id.
    #[serde(default)]
    pub client_id: String,

    /// Minimum spacing between Imgur calls.
    #[serde(default = "default_imgur_interval")]
    pub min_interval_ms: u64,

    #[serde(default = "default_imgur_api")]
    pub api_base: String,
}

impl Default for ImgurConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            min_interval_ms: default_imgur_interval(),
            api_base: default_imgur_api(),
        }
    }
}

/// Redgifs options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedgifsConfig {
    /// Fixed bearer token; a temporary one is fetched when absent or rejected.
    #[serde(default)]
    pub token: Option<String>,

    /// Rendition names to try, best first.
    #[serde(default = "default_renditions")]
    pub renditions: Vec<String>,

    /// Minimum spacing between token refreshes.
    #[serde(default = "default_token_refresh_interval")]
    pub token_refresh_interval_ms: u64,

    #[serde(default = "default_redgifs_api")]
    pub api_base: String,
}

impl Default for RedgifsConfig {
    fn default() -> Self {
        Self {
            token: None,
            renditions: default_renditions(),
            token_refresh_interval_ms: default_token_refresh_interval(),
            api_base: default_redgifs_api(),
        }
    }
}

/// Gfycat options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GfycatConfig {
    #[serde(default = "default_gfycat_page")]
    pub page_base: String,
}

impl Default for GfycatConfig {
    fn default() -> Self {
        Self {
            page_base: default_gfycat_page(),
        }
    }
}

fn default_workers() -> usize {
    1
}

fn default_user_agent() -> String {
    concat!("reddit-media-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

fn default_imgur_interval() -> u64 {
    2000
}

fn default_imgur_api() -> String {
    "https://api.imgur.com".to_string()
}

fn default_renditions() -> Vec<String> {
    vec!["hd".to_string(), "sd".to_string()]
}

fn default_token_refresh_interval() -> u64 {
    5000
}

fn default_redgifs_api() -> String {
    "https://api.redgifs.com".to_string()
}

fn default_gfycat_page() -> String {
    "https://gfycat.com".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Freeze this configuration into the settings a run uses.
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            download_directory: self.download_directory(),
            workers: self.options.workers,
            user_agent: self.options.user_agent.clone(),
            show_downloads: self.options.show_downloads,
            imgur: ImgurSettings {
                client_id: self.imgur.client_id.clone(),
                min_interval: Duration::from_millis(self.imgur.min_interval_ms),
                api_base: self.imgur.api_base.clone(),
            },
            redgifs: RedgifsSettings {
                token: self.redgifs.token.clone(),
                renditions: self.redgifs.renditions.clone(),
                token_refresh_interval: Duration::from_millis(
                    self.redgifs.token_refresh_interval_ms,
                ),
                api_base: self.redgifs.api_base.clone(),
            },
            gfycat: GfycatSettings {
                page_base: self.gfycat.page_base.clone(),
            },
        }
    }
}
