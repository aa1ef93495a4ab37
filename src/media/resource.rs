//! Resource descriptors and extension helpers.

/// Where a resource's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSource {
    /// Absolute URL to stream from.
    Remote(String),
    /// Content produced locally (self-text posts).
    Inline(String),
}

/// One concrete file derived from a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub source: ResourceSource,

    /// File extension (without dot).
    pub extension: String,

    /// 1-based position inside a multi-file post.
    pub ordinal: Option<u32>,
}

impl ResourceDescriptor {
    /// A file to download from `url`.
    pub fn remote(url: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            source: ResourceSource::Remote(url.into()),
            extension: extension.into(),
            ordinal: None,
        }
    }

    /// A file whose content is already known.
    pub fn inline(content: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            source: ResourceSource::Inline(content.into()),
            extension: extension.into(),
            ordinal: None,
        }
    }

    /// Set the position of this resource inside its post.
    pub fn with_ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Remote URL, if this resource is fetched over the network.
    pub fn url(&self) -> Option<&str> {
        match &self.source {
            ResourceSource::Remote(url) => Some(url),
            ResourceSource::Inline(_) => None,
        }
    }
}

/// Extract extension from URL path.
pub fn extension_from_url(url: &str) -> Option<String> {
    // Remove query string and fragment
    let path = url.split(['?', '#']).next()?;

    // Get the last segment
    let filename = path.rsplit('/').next()?;

    let (_, ext) = filename.rsplit_once('.')?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_lowercase())
    } else {
        None
    }
}

/// Convert a MIME type to a file extension.
pub fn extension_for_mime(mimetype: &str) -> Option<String> {
    let essence = mimetype.split(';').next().unwrap_or("").trim();

    let known = match essence {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "text/markdown" => Some("md"),
        _ => None,
    };

    if let Some(ext) = known {
        return Some(ext.to_string());
    }

    mime_guess::get_mime_extensions_str(essence)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://example.com/file.jpg"),
            Some("jpg".to_string())
        );
        assert_eq!(
            extension_from_url("https://example.com/file.jpg?token=abc"),
            Some("jpg".to_string())
        );
        assert_eq!(
            extension_from_url("https://example.com/path/to/file.PNG#frag"),
            Some("png".to_string())
        );
        assert_eq!(extension_from_url("https://i.redd.it/abcdef"), None);
    }

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg").as_deref(), Some("jpg"));
        assert_eq!(
            extension_for_mime("video/mp4; codecs=avc1").as_deref(),
            Some("mp4")
        );
        assert_eq!(extension_for_mime("unknown/type"), None);
    }

    #[test]
    fn test_resource_constructors() {
        let r = ResourceDescriptor::remote("https://x/y.png", "png").with_ordinal(2);
        assert_eq!(r.url(), Some("https://x/y.png"));
        assert_eq!(r.ordinal, Some(2));

        let text = ResourceDescriptor::inline("# hi", "md");
        assert_eq!(text.url(), None);
        assert_eq!(text.ordinal, None);
    }
}
