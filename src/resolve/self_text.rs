//! Text posts rendered to Markdown.

use async_trait::async_trait;

use crate::error::Result;
use crate::media::{PostDescriptor, ResourceDescriptor};
use crate::resolve::Resolver;

/// Markdown document for a text post: title link, body, submitter footer.
pub fn render_markdown(post: &PostDescriptor) -> String {
    let mut doc = format!("## [{}]({})\n", post.title, post.url);

    if let Some(body) = post.content.as_deref() {
        doc.push_str(body);
    }

    let submitter = post.submitter.as_deref().unwrap_or("[deleted]");
    doc.push_str(&format!(
        "\n\n---\n\nsubmitted by [u/{0}](https://www.reddit.com/user/{0})",
        submitter
    ));

    doc
}

/// Produces one inline `.md` resource without touching the network.
#[derive(Debug, Default)]
pub struct SelfTextResolver;

#[async_trait]
impl Resolver for SelfTextResolver {
    async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
        Ok(vec![ResourceDescriptor::inline(render_markdown(post), "md")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::ResourceSource;

    #[tokio::test]
    async fn test_renders_inline_markdown() {
        let mut post = PostDescriptor::new(
            "abc",
            "rust",
            "Ownership question",
            "https://www.reddit.com/r/rust/comments/abc/ownership_question/",
        );
        post.content = Some("Why does this not compile?".into());
        post.submitter = Some("ferris".into());

        let resources = SelfTextResolver.resolve(&post).await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].extension, "md");

        let ResourceSource::Inline(text) = &resources[0].source else {
            panic!("expected inline content");
        };
        assert!(text.starts_with(
            "## [Ownership question](https://www.reddit.com/r/rust/comments/abc/ownership_question/)\n"
        ));
        assert!(text.contains("Why does this not compile?"));
        assert!(text.ends_with("submitted by [u/ferris](https://www.reddit.com/user/ferris)"));
    }

    #[test]
    fn test_missing_body_and_submitter() {
        let post = PostDescriptor::new("abc", "rust", "Title only", "https://reddit.com/r/rust/comments/abc");
        let doc = render_markdown(&post);

        assert!(doc.contains("u/[deleted]"));
    }
}
