//! Imgur resolver backed by the quota-metered API.

use async_trait::async_trait;
use url::Url;

use crate::api::{ImgurApi, ImgurImage};
use crate::error::{Error, Result};
use crate::limit::QuotaState;
use crate::media::{extension_for_mime, extension_from_url, PostDescriptor, ResourceDescriptor};
use crate::resolve::Resolver;

/// What an Imgur link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImgurLink {
    Image(String),
    Album(String),
    Gallery(String),
}

impl ImgurLink {
    /// Parse an Imgur page or file link.
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let unrecognized = || Error::Resolution(format!("unrecognized Imgur link: {}", link));

        let parsed = match segments.as_slice() {
            ["a", id, ..] => ImgurLink::Album(slug_id(id)),
            ["gallery", id, ..] | ["t", _, id, ..] => ImgurLink::Gallery(slug_id(id)),
            ["r", _, id, ..] => ImgurLink::Gallery(slug_id(id)),
            [file] => {
                let stem = file.split('.').next().unwrap_or(file);
                ImgurLink::Image(stem.to_string())
            }
            _ => return Err(unrecognized()),
        };

        match &parsed {
            ImgurLink::Image(id) | ImgurLink::Album(id) | ImgurLink::Gallery(id)
                if id.is_empty() =>
            {
                Err(unrecognized())
            }
            _ => Ok(parsed),
        }
    }
}

/// Titled links carry the id after the last dash (`/a/some-title-AbC12`).
fn slug_id(segment: &str) -> String {
    let segment = segment.split('.').next().unwrap_or(segment);
    segment.rsplit('-').next().unwrap_or(segment).to_string()
}

/// Resource for one Imgur image, preferring the mp4 rendition of animations.
fn image_resource(image: &ImgurImage) -> ResourceDescriptor {
    if image.animated {
        if let Some(mp4) = image.mp4.as_deref().filter(|u| !u.is_empty()) {
            return ResourceDescriptor::remote(mp4, "mp4");
        }
    }

    match extension_from_url(&image.link).as_deref() {
        Some("gifv") => {
            let link = format!("{}mp4", image.link.trim_end_matches("gifv"));
            ResourceDescriptor::remote(link, "mp4")
        }
        Some(ext) => ResourceDescriptor::remote(&image.link, ext),
        None => {
            let ext = extension_for_mime(&image.mimetype).unwrap_or_else(|| "jpg".to_string());
            ResourceDescriptor::remote(&image.link, ext)
        }
    }
}

fn numbered(images: &[ImgurImage]) -> Vec<ResourceDescriptor> {
    images
        .iter()
        .enumerate()
        .map(|(i, image)| image_resource(image).with_ordinal(i as u32 + 1))
        .collect()
}

/// Resolves Imgur images, albums and galleries.
#[derive(Debug)]
pub struct ImgurResolver {
    api: ImgurApi,
}

impl ImgurResolver {
    pub fn new(api: ImgurApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Resolver for ImgurResolver {
    async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
        let resources = match ImgurLink::parse(&post.url)? {
            ImgurLink::Image(id) => vec![image_resource(&self.api.image(&id).await?)],
            ImgurLink::Album(id) => numbered(&self.api.album_images(&id).await?),
            ImgurLink::Gallery(id) => {
                let item = self.api.gallery(&id).await?;
                if item.is_album {
                    numbered(&item.into_images())
                } else {
                    item.into_images().iter().map(image_resource).collect()
                }
            }
        };

        tracing::debug!("Imgur post {} resolved to {} file(s)", post.id, resources.len());
        Ok(resources)
    }

    async fn quota(&self) -> Result<Option<QuotaState>> {
        Ok(Some(self.api.credits().await?))
    }
}
