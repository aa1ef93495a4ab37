//! Redgifs API HTTP client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::api::types::*;
use crate::error::{Error, Result};
use crate::limit::{retry_with_backoff, Clock, TokenBucket};

/// Attempts for fetching a temporary token.
const TOKEN_ATTEMPTS: u32 = 3;

/// Redgifs API client with a lazily refreshed bearer token.
///
/// The token is shared by every request made through this client and is
/// replaced only when the API answers 401.
#[derive(Debug)]
pub struct RedgifsApi {
    client: Client,
    api_base: String,
    token: RwLock<Option<String>>,
    refresh_limit: TokenBucket,
    clock: Arc<dyn Clock>,
}

impl RedgifsApi {
    pub fn new(
        client: Client,
        api_base: String,
        token: Option<String>,
        refresh_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: RwLock::new(token.filter(|t| !t.is_empty())),
            refresh_limit: TokenBucket::new(1, refresh_interval),
            clock,
        }
    }

    /// Current bearer token, fetching one if none is cached.
    pub async fn token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }
        self.refresh_token(None).await
    }

    /// Replace the cached token.
    ///
    /// `stale` is the token the caller saw rejected; if another request already
    /// replaced it, the newer token is returned without a second refresh.
    async fn refresh_token(&self, stale: Option<&str>) -> Result<String> {
        let mut cached = self.token.write().await;

        if let Some(current) = cached.as_deref() {
            if stale != Some(current) {
                return Ok(current.to_string());
            }
        }

        self.refresh_limit.acquire(self.clock.as_ref()).await;

        let auth = retry_with_backoff(self.clock.as_ref(), TOKEN_ATTEMPTS, || {
            self.fetch_temporary_token()
        })
        .await?;

        tracing::debug!("Obtained new Redgifs token");
        *cached = Some(auth.token.clone());
        Ok(auth.token)
    }

    async fn fetch_temporary_token(&self) -> Result<RedgifsAuth> {
        let url = format!("{}/v2/auth/temporary", self.api_base);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(format!(
                "Redgifs token request failed: HTTP {}",
                status
            )));
        }

        Ok(response.json().await?)
    }

    async fn send(&self, path: &str, token: &str) -> Result<Response> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        tracing::debug!("Response status: {}", response.status());
        Ok(response)
    }

    /// Authenticated GET, refreshing the token once on 401.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.token().await?;
        let mut response = self.send(path, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let fresh = self.refresh_token(Some(&token)).await?;
            response = self.send(path, &fresh).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Resolution(format!(
                "authentication rejected by Redgifs (HTTP {})",
                status
            )));
        }

        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(Error::Resolution(format!(
                "resource deleted upstream (HTTP {})",
                status
            )));
        }

        if !status.is_success() {
            return Err(Error::Resolution(format!("Redgifs returned HTTP {}", status)));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Resolution(format!(
                "Failed to parse Redgifs response: {} - Response: {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Get item info by slug.
    pub async fn gif(&self, id: &str) -> Result<RedgifsGif> {
        let response: RedgifsGifResponse = self.get_json(&format!("/v2/gifs/{}", id)).await?;
        Ok(response.gif)
    }

    /// Get all items of a gallery.
    pub async fn gallery(&self, id: &str) -> Result<Vec<RedgifsGif>> {
        let response: RedgifsGalleryResponse =
            self.get_json(&format!("/v2/gallery/{}", id)).await?;
        Ok(response.gifs)
    }

    /// Whether a rendition URL currently answers with success.
    pub async fn is_fetchable(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}
