//! Gfycat resolver: scrapes the media URL out of the watch page.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};

use crate::error::{Error, Result};
use crate::media::{extension_from_url, PostDescriptor, ResourceDescriptor};
use crate::resolve::Resolver;

/// Patterns for the embedded media URL, most specific first.
fn page_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r#"<source[^>]*\bsrc="([^"]+\.mp4)""#,
            r#""contentUrl"\s*:\s*"([^"]+)""#,
            r#"<meta[^>]*property="og:video"[^>]*content="([^"]+)""#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("gfycat page pattern is valid"))
        .collect()
    })
}

/// Extract the media URL from a Gfycat watch page.
pub fn find_media_url(html: &str) -> Option<String> {
    page_patterns()
        .iter()
        .find_map(|p| p.captures(html).and_then(|c| c.get(1)))
        .map(|m| m.as_str().replace("\\u002F", "/").replace("&amp;", "&"))
}

/// Resolves Gfycat (and gifdeliverynetwork) links.
#[derive(Debug)]
pub struct GfycatResolver {
    client: Client,
    page_base: String,
}

impl GfycatResolver {
    pub fn new(client: Client, page_base: String) -> Self {
        Self {
            client,
            page_base: page_base.trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, link: &str) -> Result<String> {
        let path = link.split(['?', '#']).next().unwrap_or(link);
        let name = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|n| !n.is_empty() && !n.contains(':'))
            .ok_or_else(|| Error::NotDownloadable(format!("no Gfycat id in {}", link)))?;

        Ok(format!("{}/{}", self.page_base, name))
    }
}

#[async_trait]
impl Resolver for GfycatResolver {
    async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
        if let Some(ext) = extension_from_url(&post.url) {
            if matches!(ext.as_str(), "mp4" | "webm" | "gif") {
                return Ok(vec![ResourceDescriptor::remote(&post.url, ext)]);
            }
        }

        let page = self.page_url(&post.url)?;
        tracing::debug!("GET {}", page);

        let response = self.client.get(&page).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(Error::NotDownloadable(format!(
                "Gfycat page deleted (HTTP {})",
                status
            )));
        }
        if !status.is_success() {
            return Err(Error::Resolution(format!("Gfycat returned HTTP {}", status)));
        }

        let html = response.text().await?;
        let url = find_media_url(&html).ok_or_else(|| {
            Error::NotDownloadable("Gfycat page structure not recognized or deleted".to_string())
        })?;

        let ext = extension_from_url(&url).unwrap_or_else(|| "mp4".to_string());
        Ok(vec![ResourceDescriptor::remote(url, ext)])
    }
}
