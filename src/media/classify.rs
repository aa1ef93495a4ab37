//! Link classification.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Which media host a post's link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostType {
    /// Imgur images, albums and galleries (quota-bearing API).
    Imgur,
    /// Gfycat pages, scraped for the embedded video.
    Gfycat,
    /// Redgifs, served through a token-authenticated API.
    Redgifs,
    /// Links that already point at a media file.
    Direct,
    /// Text posts, written out as Markdown.
    #[serde(rename = "self")]
    SelfText,
    /// Anything else. Unknown tags read from old log files land here too.
    #[serde(other)]
    Unsupported,
}

impl HostType {
    /// All host types that have a resolver.
    pub const SUPPORTED: [HostType; 5] = [
        HostType::Imgur,
        HostType::Gfycat,
        HostType::Redgifs,
        HostType::Direct,
        HostType::SelfText,
    ];
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Imgur => write!(f, "imgur"),
            HostType::Gfycat => write!(f, "gfycat"),
            HostType::Redgifs => write!(f, "redgifs"),
            HostType::Direct => write!(f, "direct"),
            HostType::SelfText => write!(f, "self"),
            HostType::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// File extensions treated as direct media links.
const DIRECT_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "gifv", "mp4", "webm"];

/// Hosts that serve raw files without an extension in the path.
const DIRECT_HOSTS: [&str; 2] = ["i.redd.it", "i.reddituploads.com"];

/// Classify a link into a host type.
///
/// Never fails: anything unrecognized, including strings that are not URLs,
/// is `Unsupported`.
pub fn classify(link: &str) -> HostType {
    let Ok(url) = Url::parse(link.trim()) else {
        return HostType::Unsupported;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return HostType::Unsupported;
    }

    let Some(host) = url.host_str().map(|h| h.to_ascii_lowercase()) else {
        return HostType::Unsupported;
    };

    if host_matches(&host, "gfycat.com") || host_matches(&host, "gifdeliverynetwork.com") {
        return HostType::Gfycat;
    }

    if host_matches(&host, "redgifs.com") {
        return HostType::Redgifs;
    }

    if host_matches(&host, "imgur.com") {
        return HostType::Imgur;
    }

    if DIRECT_HOSTS.contains(&host.as_str()) || has_direct_extension(url.path()) {
        return HostType::Direct;
    }

    if host_matches(&host, "reddit.com") && url.path().contains("/comments/") {
        return HostType::SelfText;
    }

    HostType::Unsupported
}

/// Whether `host` is `domain` or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn has_direct_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| DIRECT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
