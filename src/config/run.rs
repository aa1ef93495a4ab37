//! Frozen per-run settings.

use std::path::PathBuf;
use std::time::Duration;

/// Everything a batch run needs, resolved from file, environment and CLI.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub download_directory: PathBuf,
    pub workers: usize,
    pub user_agent: String,
    pub show_downloads: bool,
    pub imgur: ImgurSettings,
    pub redgifs: RedgifsSettings,
    pub gfycat: GfycatSettings,
}

#[derive(Debug, Clone)]
pub struct ImgurSettings {
    pub client_id: String,
    pub min_interval: Duration,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct RedgifsSettings {
    pub token: Option<String>,
    pub renditions: Vec<String>,
    pub token_refresh_interval: Duration,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct GfycatSettings {
    pub page_base: String,
}
