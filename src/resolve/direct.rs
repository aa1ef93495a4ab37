//! Direct file links.

use async_trait::async_trait;
use reqwest::{header, Client};

use crate::error::Result;
use crate::media::{extension_for_mime, extension_from_url, PostDescriptor, ResourceDescriptor};
use crate::resolve::Resolver;

/// Extension used when neither the URL nor the server names one.
const FALLBACK_EXTENSION: &str = "jpg";

/// Passes the post URL through as the single resource.
#[derive(Debug)]
pub struct DirectResolver {
    client: Client,
}

impl DirectResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Ask the server what the link serves.
    async fn guess_extension(&self, url: &str) -> Option<String> {
        let response = match self.client.head(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                return None;
            }
        };

        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extension_for_mime)
    }
}

#[async_trait]
impl Resolver for DirectResolver {
    async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
        let resource = match extension_from_url(&post.url) {
            Some(ext) if ext == "gifv" => {
                let path_end = post.url.find(['?', '#']).unwrap_or(post.url.len());
                let (path, rest) = post.url.split_at(path_end);
                let rewritten = format!("{}mp4{}", path.trim_end_matches("gifv"), rest);
                ResourceDescriptor::remote(rewritten, "mp4")
            }
            Some(ext) => ResourceDescriptor::remote(&post.url, ext),
            None => {
                let ext = self
                    .guess_extension(&post.url)
                    .await
                    .unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
                ResourceDescriptor::remote(&post.url, ext)
            }
        };

        Ok(vec![resource])
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn post(url: &str) -> PostDescriptor {
        PostDescriptor::new("p", "pics", "t", url)
    }

    #[tokio::test]
    async fn test_extension_from_url() {
        let resolver = DirectResolver::new(Client::new());
        let resources = resolver.resolve(&post("https://i.redd.it/abc.png")).await.unwrap();

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].extension, "png");
        assert_eq!(resources[0].url(), Some("https://i.redd.it/abc.png"));
    }

    #[tokio::test]
    async fn test_gifv_rewritten_to_mp4() {
        let resolver = DirectResolver::new(Client::new());
        let resources = resolver
            .resolve(&post("https://i.imgur.com/abc.gifv?x=1"))
            .await
            .unwrap();

        assert_eq!(resources[0].extension, "mp4");
        assert_eq!(resources[0].url(), Some("https://i.imgur.com/abc.mp4?x=1"));
    }

    #[tokio::test]
    async fn test_content_type_guess() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/media"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "video/webm"))
            .mount(&server)
            .await;

        let resolver = DirectResolver::new(Client::new());
        let url = format!("{}/media", server.uri());
        let resources = resolver.resolve(&post(&url)).await.unwrap();

        assert_eq!(resources[0].extension, "webm");
    }

    #[tokio::test]
    async fn test_falls_back_to_jpg() {
        let server = MockServer::start().await;
        let resolver = DirectResolver::new(Client::new());
        let url = format!("{}/unknown", server.uri());

        let resources = resolver.resolve(&post(&url)).await.unwrap();
        assert_eq!(resources[0].extension, "jpg");
    }
}
