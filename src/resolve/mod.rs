//! Host resolvers: turn a post into the concrete files to fetch.

mod direct;
mod gfycat;
mod imgur;
mod redgifs;
mod self_text;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::api::{ImgurApi, RedgifsApi};
use crate::config::RunConfig;
use crate::error::Result;
use crate::limit::{Clock, QuotaState};
use crate::media::{HostType, PostDescriptor, ResourceDescriptor};

pub use direct::DirectResolver;
pub use gfycat::GfycatResolver;
pub use imgur::{ImgurLink, ImgurResolver};
pub use redgifs::{extract_id as redgifs_id, RedgifsResolver};
pub use self_text::{render_markdown, SelfTextResolver};

/// Resolves posts of one host type.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Concrete files for `post`, in display order.
    async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>>;

    /// Remaining request quota, for hosts that meter it.
    async fn quota(&self) -> Result<Option<QuotaState>> {
        Ok(None)
    }
}

/// One resolver per supported host type.
#[derive(Clone)]
pub struct Resolvers {
    imgur: Arc<dyn Resolver>,
    gfycat: Arc<dyn Resolver>,
    redgifs: Arc<dyn Resolver>,
    direct: Arc<dyn Resolver>,
    self_text: Arc<dyn Resolver>,
}

impl Resolvers {
    /// Build the production resolvers sharing one HTTP client.
    pub fn from_config(config: &RunConfig, client: Client, clock: Arc<dyn Clock>) -> Self {
        let imgur = ImgurApi::new(
            client.clone(),
            config.imgur.client_id.clone(),
            config.imgur.api_base.clone(),
        );
        let redgifs = RedgifsApi::new(
            client.clone(),
            config.redgifs.api_base.clone(),
            config.redgifs.token.clone(),
            config.redgifs.token_refresh_interval,
            clock,
        );

        Self {
            imgur: Arc::new(ImgurResolver::new(imgur)),
            gfycat: Arc::new(GfycatResolver::new(
                client.clone(),
                config.gfycat.page_base.clone(),
            )),
            redgifs: Arc::new(RedgifsResolver::new(
                redgifs,
                config.redgifs.renditions.clone(),
            )),
            direct: Arc::new(DirectResolver::new(client)),
            self_text: Arc::new(SelfTextResolver),
        }
    }

    /// Replace the resolver for `host`. Unsupported hosts have no slot.
    pub fn with(mut self, host: HostType, resolver: Arc<dyn Resolver>) -> Self {
        match host {
            HostType::Imgur => self.imgur = resolver,
            HostType::Gfycat => self.gfycat = resolver,
            HostType::Redgifs => self.redgifs = resolver,
            HostType::Direct => self.direct = resolver,
            HostType::SelfText => self.self_text = resolver,
            HostType::Unsupported => {}
        }
        self
    }

    /// Resolver for `host`, or `None` for unsupported hosts.
    pub fn get(&self, host: HostType) -> Option<&Arc<dyn Resolver>> {
        match host {
            HostType::Imgur => Some(&self.imgur),
            HostType::Gfycat => Some(&self.gfycat),
            HostType::Redgifs => Some(&self.redgifs),
            HostType::Direct => Some(&self.direct),
            HostType::SelfText => Some(&self.self_text),
            HostType::Unsupported => None,
        }
    }
}

impl std::fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolvers").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::limit::ManualClock;

    #[test]
    fn test_every_supported_host_has_a_resolver() {
        let run = Config::default().run_config();
        let resolvers = Resolvers::from_config(&run, Client::new(), Arc::new(ManualClock::default()));

        for host in HostType::SUPPORTED {
            assert!(resolvers.get(host).is_some(), "no resolver for {host}");
        }
        assert!(resolvers.get(HostType::Unsupported).is_none());
    }
}
