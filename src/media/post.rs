//! Post descriptor representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::media::classify::{classify, HostType};

/// One listed post to potentially download from.
///
/// Field names on the wire match the log files written by earlier runs, so a
/// failure log can be fed straight back in as input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDescriptor {
    /// Platform-assigned post id.
    #[serde(rename = "postId")]
    pub id: String,

    /// Subreddit the post was made in; also the download subdirectory.
    #[serde(rename = "postSubreddit")]
    pub subreddit: String,

    #[serde(rename = "postTitle")]
    pub title: String,

    /// Link the post points at.
    #[serde(rename = "postURL")]
    pub url: String,

    /// Host type, `None` until classified.
    #[serde(rename = "postType", default)]
    pub host_type: Option<HostType>,

    #[serde(
        rename = "postSubmitter",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub submitter: Option<String>,

    /// Self-text body, only present for text posts.
    #[serde(rename = "postContent", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Any other platform metadata, kept verbatim.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl PostDescriptor {
    /// Create a post with no host type and no extra metadata.
    pub fn new(
        id: impl Into<String>,
        subreddit: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subreddit: subreddit.into(),
            title: title.into(),
            url: url.into(),
            host_type: None,
            submitter: None,
            content: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Return a copy of this post tagged with the given host type.
    pub fn with_host_type(&self, host_type: HostType) -> Self {
        Self {
            host_type: Some(host_type),
            ..self.clone()
        }
    }

    /// Host type of this post, classifying the URL when no tag is stored.
    pub fn effective_host_type(&self) -> HostType {
        self.host_type.unwrap_or_else(|| classify(&self.url))
    }

    /// Link to the post's comment page.
    pub fn permalink(&self) -> String {
        format!(
            "https://reddit.com/r/{}/comments/{}",
            self.subreddit, self.id
        )
    }
}
