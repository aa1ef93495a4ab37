//! API response type definitions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::limit::QuotaState;

/// Imgur response wrapper.
#[derive(Debug, Deserialize)]
pub struct ImgurEnvelope<T> {
    pub data: T,
    #[serde(default)]
    pub success: bool,
}

/// Imgur `/3/credits` payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImgurCredits {
    pub user_limit: u64,
    pub user_remaining: u64,
    /// Unix timestamp (seconds) at which the user allowance resets.
    pub user_reset: i64,
    pub client_limit: u64,
    pub client_remaining: u64,
}

impl From<ImgurCredits> for QuotaState {
    fn from(credits: ImgurCredits) -> Self {
        QuotaState {
            short_remaining: credits.user_remaining,
            long_remaining: credits.client_remaining,
            reset_at: DateTime::<Utc>::from_timestamp(credits.user_reset, 0),
        }
    }
}

/// A single Imgur image.
#[derive(Debug, Clone, Deserialize)]
pub struct ImgurImage {
    pub id: String,
    /// MIME type, e.g. `image/jpeg`.
    #[serde(rename = "type", default)]
    pub mimetype: String,
    pub link: String,
    #[serde(default)]
    pub animated: bool,
    /// MP4 rendition of animated images.
    pub mp4: Option<String>,
}

/// An Imgur gallery entry: either an album or a single image.
#[derive(Debug, Clone, Deserialize)]
pub struct ImgurGalleryItem {
    pub id: String,
    #[serde(default)]
    pub is_album: bool,
    #[serde(default)]
    pub images: Vec<ImgurImage>,
    #[serde(rename = "type", default)]
    pub mimetype: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub animated: bool,
    pub mp4: Option<String>,
}

impl ImgurGalleryItem {
    /// Images contained in this entry, in display order.
    pub fn into_images(self) -> Vec<ImgurImage> {
        if self.is_album {
            return self.images;
        }

        match self.link {
            Some(link) => vec![ImgurImage {
                id: self.id,
                mimetype: self.mimetype.unwrap_or_default(),
                link,
                animated: self.animated,
                mp4: self.mp4,
            }],
            None => Vec::new(),
        }
    }
}

/// Redgifs `/v2/auth/temporary` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RedgifsAuth {
    pub token: String,
}

/// Redgifs `/v2/gifs/{id}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RedgifsGifResponse {
    pub gif: RedgifsGif,
}

/// Redgifs `/v2/gallery/{id}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RedgifsGalleryResponse {
    #[serde(default)]
    pub gifs: Vec<RedgifsGif>,
}

/// One Redgifs item.
#[derive(Debug, Clone, Deserialize)]
pub struct RedgifsGif {
    pub id: String,
    /// Rendition name (`hd`, `sd`, `poster`, ...) to URL.
    #[serde(default)]
    pub urls: BTreeMap<String, Option<String>>,
    /// Gallery id when the item belongs to a multi-item post.
    #[serde(default)]
    pub gallery: Option<String>,
}

impl RedgifsGif {
    /// URL of the named rendition, if the item reports one.
    pub fn rendition(&self, name: &str) -> Option<&str> {
        self.urls.get(name).and_then(|url| url.as_deref())
    }
}
