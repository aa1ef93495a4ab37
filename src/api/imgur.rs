//! Imgur API HTTP client.

use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::types::*;
use crate::error::{Error, Result};
use crate::limit::QuotaState;

/// Imgur API client authenticated with an application client id.
#[derive(Debug, Clone)]
pub struct ImgurApi {
    client: Client,
    client_id: String,
    api_base: String,
}

impl ImgurApi {
    pub fn new(client: Client, client_id: String, api_base: String) -> Self {
        Self {
            client,
            client_id,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Make an authenticated GET request.
    async fn get(&self, path: &str) -> Result<Response> {
        if self.client_id.is_empty() {
            return Err(Error::Authentication(
                "no Imgur client id configured".to_string(),
            ));
        }

        let url = format!("{}{}", self.api_base, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.client_id))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        // Check for auth errors
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Imgur auth error response: {}", body);
            return Err(Error::Authentication(format!(
                "Imgur rejected the client id (HTTP {})",
                status
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::Resolution(
                "resource deleted upstream (HTTP 404)".to_string(),
            ));
        }

        // Rate limiting and server errors are worth another try
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(Error::Api(format!("Imgur returned HTTP {}", status)));
        }

        if !status.is_success() {
            return Err(Error::Resolution(format!("Imgur returned HTTP {}", status)));
        }

        Ok(response)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let text = self.get(path).await?.text().await?;

        let envelope: ImgurEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            Error::Resolution(format!(
                "Failed to parse {}: {} - Response: {}",
                what,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })?;

        if !envelope.success {
            return Err(Error::Resolution(format!("Imgur reported failure for {}", what)));
        }

        Ok(envelope.data)
    }

    /// Remaining request credits for this client.
    pub async fn credits(&self) -> Result<QuotaState> {
        let credits: ImgurCredits = self.get_data("/3/credits", "credits").await?;
        Ok(credits.into())
    }

    /// Get a single image by id.
    pub async fn image(&self, id: &str) -> Result<ImgurImage> {
        self.get_data(&format!("/3/image/{}", id), "image").await
    }

    /// Get all images of an album.
    pub async fn album_images(&self, id: &str) -> Result<Vec<ImgurImage>> {
        self.get_data(&format!("/3/album/{}/images", id), "album")
            .await
    }

    /// Get a gallery entry (album or image).
    pub async fn gallery(&self, id: &str) -> Result<ImgurGalleryItem> {
        self.get_data(&format!("/3/gallery/{}", id), "gallery").await
    }
}
