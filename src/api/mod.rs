//! Host API clients.
//!
//! This module provides:
//! - Imgur REST client (images, albums, galleries, credits)
//! - Redgifs REST client with temporary bearer token management
//! - API response types

pub mod imgur;
pub mod redgifs;
pub mod types;

use reqwest::Client;

use crate::error::{Error, Result};

pub use imgur::ImgurApi;
pub use redgifs::RedgifsApi;
pub use types::*;

/// Build the HTTP client shared by resolvers and transfers.
pub fn build_client(user_agent: &str) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))
}
