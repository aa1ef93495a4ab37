//! Redgifs resolver with rendition fallback.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;

use crate::api::{RedgifsApi, RedgifsGif};
use crate::error::{Error, Result};
use crate::media::{extension_from_url, PostDescriptor, ResourceDescriptor};
use crate::resolve::Resolver;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)redgifs\.com/(?:watch/|ifr/|i/)?([a-z0-9]+)(?:[-./?#]|$)")
            .expect("redgifs id pattern is valid")
    })
}

/// Path prefixes that can never be an item id.
const RESERVED_SEGMENTS: [&str; 3] = ["watch", "ifr", "i"];

/// Canonical lowercase slug of a Redgifs watch page or file link.
///
/// File links carry the slug in CamelCase with an optional rendition suffix
/// (`-mobile`, `-medium`); both forms map to the same id.
pub fn extract_id(link: &str) -> Result<String> {
    id_pattern()
        .captures(link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .filter(|id| !RESERVED_SEGMENTS.contains(&id.as_str()))
        .ok_or_else(|| Error::Resolution(format!("could not find a Redgifs id in {}", link)))
}

/// Resolves Redgifs items and galleries.
#[derive(Debug)]
pub struct RedgifsResolver {
    api: RedgifsApi,
    renditions: Vec<String>,
}

impl RedgifsResolver {
    /// `renditions` lists the tiers to try, best first.
    pub fn new(api: RedgifsApi, renditions: Vec<String>) -> Self {
        Self { api, renditions }
    }

    /// Pick the best rendition of `gif` that actually answers.
    async fn best_rendition(&self, gif: &RedgifsGif) -> Result<ResourceDescriptor> {
        for tier in &self.renditions {
            let Some(url) = gif.rendition(tier) else {
                continue;
            };

            if self.api.is_fetchable(url).await {
                let ext = extension_from_url(url).unwrap_or_else(|| "mp4".to_string());
                return Ok(ResourceDescriptor::remote(url, ext));
            }

            tracing::warn!("Redgifs {} rendition of {} unavailable, trying next", tier, gif.id);
        }

        Err(Error::Resolution(format!(
            "no fetchable rendition for Redgifs item {}",
            gif.id
        )))
    }
}

#[async_trait]
impl Resolver for RedgifsResolver {
    async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
        let id = extract_id(&post.url)?;
        let gif = self.api.gif(&id).await?;

        let Some(gallery) = gif.gallery.as_deref().filter(|g| !g.is_empty()) else {
            return Ok(vec![self.best_rendition(&gif).await?]);
        };

        let members = self.api.gallery(gallery).await?;
        let mut resources = Vec::with_capacity(members.len());
        for (i, member) in members.iter().enumerate() {
            resources.push(self.best_rendition(member).await?.with_ordinal(i as u32 + 1));
        }

        tracing::debug!("Redgifs gallery {} has {} item(s)", gallery, resources.len());
        Ok(resources)
    }
}
