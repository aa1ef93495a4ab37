//! Configuration module for reddit-media-dl.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Freezing file, environment and CLI values into a `RunConfig`
//! - Configuration validation

pub mod loader;
pub mod run;
pub mod validation;

pub use loader::{Config, GfycatConfig, ImgurConfig, OptionsConfig, RedgifsConfig};
pub use run::{GfycatSettings, ImgurSettings, RedgifsSettings, RunConfig};
pub use validation::validate_config;
