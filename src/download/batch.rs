//! Batch orchestration: classify, dedup, gate, resolve and transfer each post.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::api::build_client;
use crate::config::RunConfig;
use crate::dedup::{DedupService, PathLocks};
use crate::download::order::{DispatchOrder, Turn};
use crate::download::state::{BatchState, BatchSummary, PostOutcome};
use crate::download::transfer::{TransferExecutor, TransferOutcome};
use crate::error::{Error, Result};
use crate::fs::destination_path;
use crate::ledger::FailureLedger;
use crate::limit::{Clock, QuotaGate, SystemClock};
use crate::media::{HostType, PostDescriptor};
use crate::output::print_post_result;
use crate::resolve::Resolvers;

/// Reason recorded when the batch is stopped from outside.
const INTERRUPTED: &str = "interrupted";

/// Downloads a sequence of posts, logging every failure.
#[derive(Debug)]
pub struct BatchDownloader {
    resolvers: Resolvers,
    gate: QuotaGate,
    dedup: DedupService,
    transfer: TransferExecutor,
    ledger: FailureLedger,
    workers: usize,
    show_downloads: bool,
    stop: AtomicBool,
}

impl BatchDownloader {
    /// Assemble a downloader from explicit parts.
    pub fn new(
        config: &RunConfig,
        resolvers: Resolvers,
        gate: QuotaGate,
        client: Client,
        ledger: FailureLedger,
    ) -> Self {
        let locks = Arc::new(PathLocks::new());
        Self {
            resolvers,
            gate,
            dedup: DedupService::new(&config.download_directory),
            transfer: TransferExecutor::new(client, locks, config.show_downloads),
            ledger,
            workers: config.workers.max(1),
            show_downloads: config.show_downloads,
            stop: AtomicBool::new(false),
        }
    }

    /// The production downloader: real hosts, system clock, Imgur spacing.
    pub fn from_config(config: &RunConfig, ledger: FailureLedger) -> Result<Self> {
        let client = build_client(&config.user_agent)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let gate = QuotaGate::new(clock.clone()).with_limit(
            HostType::Imgur,
            1,
            config.imgur.min_interval,
        );
        let resolvers = Resolvers::from_config(config, client.clone(), clock);

        Ok(Self::new(config, resolvers, gate, client, ledger))
    }

    pub fn ledger(&self) -> &FailureLedger {
        &self.ledger
    }

    /// Ask the running batch to start no further posts.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Process `posts` in order and report what happened.
    ///
    /// Every failure is written to the ledger before the next result is
    /// counted. An authentication failure at a quota-metered host stops the
    /// batch: no post after it is resolved, transferred or counted.
    pub async fn run_batch(&self, posts: Vec<PostDescriptor>) -> Result<BatchSummary> {
        let total = posts.len();
        let mut state = BatchState::default();
        let order = DispatchOrder::new();
        let order = &order;

        let mut results = stream::iter(posts.into_iter().enumerate())
            .map(move |(i, post)| async move {
                let turn = order.turn(i);
                if self.is_stopped() {
                    return None;
                }
                let host = post.effective_host_type();
                let post = post.with_host_type(host);
                let outcome = self.process_post(&post, host, turn).await?;
                Some((i + 1, post, host, outcome))
            })
            .buffered(self.workers);

        while let Some(result) = results.next().await {
            let Some((index, post, host, outcome)) = result else {
                continue;
            };

            if let PostOutcome::Failed { reason, .. } = &outcome {
                if let Err(e) = self.ledger.add(index, reason.clone(), &post).await {
                    tracing::error!("Could not log failure of post {} ({}): {}", index, post.id, e);
                }
            }

            state.record(&outcome);

            if self.show_downloads {
                print_post_result(index, total, &post, host, &outcome, state.duplicate_count);
            }

            if matches!(outcome, PostOutcome::Failed { fatal: true, .. }) {
                break;
            }
        }
        drop(results);

        if self.is_stopped() && state.aborted.is_none() {
            state.aborted = Some(INTERRUPTED.to_string());
        }

        if let Some(reason) = &state.aborted {
            tracing::error!("Batch stopped after {} of {} posts: {}", state.attempted, total, reason);
        }

        let logged = self.ledger.len().await;
        if logged > 0 {
            tracing::info!("{} failed posts logged to {}", logged, self.ledger.path().display());
        }

        Ok(state.into_summary(self.ledger.path().to_path_buf()))
    }

    /// Drive one post through dedup, gate, resolve and transfer.
    ///
    /// Returns `None` when the batch was stopped before the post reached a
    /// host. The turn is held until resolving is done.
    async fn process_post(
        &self,
        post: &PostDescriptor,
        host: HostType,
        turn: Turn<'_>,
    ) -> Option<PostOutcome> {
        let Some(resolver) = self.resolvers.get(host) else {
            tracing::debug!("No resolver for {} ({})", post.id, post.url);
            return Some(PostOutcome::Skipped(format!("unsupported link: {}", post.url)));
        };

        match self.dedup.exists(post).await {
            Ok(Some(path)) => return Some(PostOutcome::Duplicate(path)),
            Ok(None) => {}
            Err(e) => return Some(self.failed(e)),
        }

        turn.ready().await;

        if self.is_stopped() {
            return None;
        }
        if let Err(e) = self.gate.before_dispatch(host, resolver.as_ref()).await {
            return Some(self.failed(e));
        }

        if self.is_stopped() {
            return None;
        }
        let resources = match resolver.resolve(post).await {
            Ok(resources) => resources,
            Err(e) => return Some(self.failed(e)),
        };
        drop(turn);

        if resources.is_empty() {
            return Some(PostOutcome::Skipped("no content".to_string()));
        }

        let mut written = Vec::new();
        let mut existing = Vec::new();
        let mut failures = Vec::new();

        for resource in &resources {
            let destination = match destination_path(self.dedup.root(), post, resource) {
                Ok(path) => path,
                Err(e) => {
                    failures.push(e.to_string());
                    continue;
                }
            };

            match self.transfer.fetch(resource, &destination).await {
                TransferOutcome::Success(path) => written.push(path),
                TransferOutcome::Duplicate(path) => existing.push(path),
                TransferOutcome::Failed(reason) => failures.push(reason),
            }
        }

        if !failures.is_empty() {
            return Some(PostOutcome::Failed {
                reason: failures.join("; "),
                fatal: false,
            });
        }

        Some(match existing.into_iter().next() {
            Some(path) if written.is_empty() => PostOutcome::Duplicate(path),
            _ => PostOutcome::Downloaded(written),
        })
    }

    /// Turn an error into a failed outcome, stopping the batch when fatal.
    fn failed(&self, error: Error) -> PostOutcome {
        let fatal = error.is_fatal();
        if fatal {
            self.stop();
        }
        PostOutcome::Failed {
            fatal,
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::Config;
    use crate::ledger::load_as_post_sequence;
    use crate::limit::{ManualClock, QuotaState};
    use crate::media::ResourceDescriptor;
    use crate::resolve::Resolver;

    /// Resolver returning one Markdown file per post, with scripted quotas.
    #[derive(Default)]
    struct FakeResolver {
        resolve_calls: AtomicU32,
        quotas: Mutex<VecDeque<QuotaState>>,
        fatal_on: Option<String>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Resolver for FakeResolver {
        async fn resolve(&self, post: &PostDescriptor) -> Result<Vec<ResourceDescriptor>> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            if self.fatal_on.as_deref() == Some(post.id.as_str()) {
                return Err(Error::Authentication("HTTP 403".into()));
            }
            if self.fail_on.as_deref() == Some(post.id.as_str()) {
                return Err(Error::Resolution("gone".into()));
            }
            Ok(vec![ResourceDescriptor::inline(format!("post {}", post.id), "md")])
        }

        async fn quota(&self) -> Result<Option<QuotaState>> {
            Ok(self.quotas.lock().unwrap().pop_front())
        }
    }

    fn healthy() -> QuotaState {
        QuotaState {
            short_remaining: 100,
            long_remaining: 1000,
            reset_at: None,
        }
    }

    fn exhausted() -> QuotaState {
        QuotaState {
            short_remaining: 0,
            long_remaining: 1000,
            reset_at: None,
        }
    }

    fn run_config(root: &std::path::Path) -> RunConfig {
        let mut config = Config::default();
        config.options.download_directory = Some(root.to_path_buf());
        config.options.show_downloads = false;
        config.run_config()
    }

    async fn downloader(
        root: &std::path::Path,
        host: HostType,
        resolver: Arc<dyn Resolver>,
    ) -> BatchDownloader {
        let config = run_config(root);
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let resolvers = Resolvers::from_config(&config, Client::new(), clock.clone()).with(host, resolver);
        let gate = QuotaGate::new(clock).with_limit(HostType::Imgur, 1, Duration::from_secs(2));
        let ledger = FailureLedger::create(root.join("LOG_FILES").join("FAILED.json"), "test")
            .await
            .unwrap();

        BatchDownloader::new(&config, resolvers, gate, Client::new(), ledger)
    }

    fn imgur_posts(n: usize) -> Vec<PostDescriptor> {
        (1..=n)
            .map(|i| {
                PostDescriptor::new(format!("p{}", i), "pics", format!("Post {}", i), "https://imgur.com/x")
                    .with_host_type(HostType::Imgur)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_duplicate_short_circuits_resolver() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pics")).unwrap();
        std::fs::write(dir.path().join("pics").join("Post_1_p1.jpg"), b"x").unwrap();

        let fake = Arc::new(FakeResolver::default());
        let dl = downloader(dir.path(), HostType::Imgur, fake.clone()).await;

        let summary = dl.run_batch(imgur_posts(1)).await.unwrap();

        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quota_exhaustion_fails_only_that_item() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver {
            quotas: Mutex::new(VecDeque::from([healthy(), exhausted()])),
            ..Default::default()
        });
        let dl = downloader(dir.path(), HostType::Imgur, fake.clone()).await;

        let mut posts = imgur_posts(2);
        let mut text = PostDescriptor::new(
            "t3",
            "rust",
            "Text",
            "https://www.reddit.com/r/rust/comments/t3/text/",
        );
        text.content = Some("body".into());
        posts.push(text);

        let summary = dl.run_batch(posts).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 2);
        assert!(summary.aborted.is_none());
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("rust").join("Text_t3.md").exists());

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary.ledger).unwrap()).unwrap();
        assert!(doc["2"][0].as_str().unwrap().contains("USER LIMIT EXCEEDED"));
        assert_eq!(doc["2"][1]["postId"], "p2");
        assert!(doc.get("1").is_none());
        assert!(doc.get("3").is_none());
    }

    #[tokio::test]
    async fn test_fatal_authentication_stops_batch() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver {
            fatal_on: Some("p3".into()),
            ..Default::default()
        });
        let dl = downloader(dir.path(), HostType::Imgur, fake.clone()).await;

        let summary = dl.run_batch(imgur_posts(10)).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.aborted.as_deref().unwrap().contains("Authentication failed"));
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 3);
        assert!(!dir.path().join("pics").join("Post_4_p4.md").exists());

        let replay = load_as_post_sequence(&summary.ledger).unwrap();
        assert_eq!(replay.len(), 1);
        assert_eq!(replay[0].id, "p3");
        assert_eq!(replay[0].host_type, Some(HostType::Imgur));
    }

    #[tokio::test]
    async fn test_unsupported_posts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver::default());
        let dl = downloader(dir.path(), HostType::Imgur, fake).await;

        let posts = vec![PostDescriptor::new("v1", "videos", "Clip", "https://v.redd.it/abc")];
        let summary = dl.run_batch(posts).await.unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert!(dl.ledger().is_empty().await);
    }

    #[tokio::test]
    async fn test_self_posts_written_as_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver::default());
        let dl = downloader(dir.path(), HostType::Imgur, fake).await;

        let mut post = PostDescriptor::new(
            "t1",
            "rust",
            "Question",
            "https://www.reddit.com/r/rust/comments/t1/question/",
        );
        post.content = Some("body".into());

        let summary = dl.run_batch(vec![post]).await.unwrap();

        assert_eq!(summary.succeeded, 1);
        let text = std::fs::read_to_string(dir.path().join("rust").join("Question_t1.md")).unwrap();
        assert!(text.contains("body"));
    }

    #[tokio::test]
    async fn test_second_run_finds_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/img\d\.jpg$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpegdata".to_vec()))
            .expect(3)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let posts: Vec<PostDescriptor> = (1..=3)
            .map(|i| {
                PostDescriptor::new(
                    format!("d{}", i),
                    "pics",
                    format!("Direct {}", i),
                    format!("{}/img{}.jpg", server.uri(), i),
                )
                .with_host_type(HostType::Direct)
            })
            .collect();

        let config = run_config(dir.path());
        let first = BatchDownloader::from_config(
            &config,
            FailureLedger::create(dir.path().join("first.json"), "1").await.unwrap(),
        )
        .unwrap();
        let summary = first.run_batch(posts.clone()).await.unwrap();
        assert_eq!(summary.succeeded, 3);

        let second = BatchDownloader::from_config(
            &config,
            FailureLedger::create(dir.path().join("second.json"), "2").await.unwrap(),
        )
        .unwrap();
        let summary = second.run_batch(posts).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.duplicates, 3);
        assert_eq!(summary.succeeded, 0);
    }

    async fn parallel_downloader(
        root: &std::path::Path,
        resolver: Arc<FakeResolver>,
        workers: usize,
    ) -> BatchDownloader {
        let mut config = run_config(root);
        config.workers = workers;

        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let resolvers = Resolvers::from_config(&config, Client::new(), clock.clone())
            .with(HostType::Imgur, resolver);
        let gate = QuotaGate::new(clock).with_limit(HostType::Imgur, 1, Duration::from_secs(2));
        let ledger = FailureLedger::create(root.join("FAILED.json"), "p").await.unwrap();

        BatchDownloader::new(&config, resolvers, gate, Client::new(), ledger)
    }

    #[tokio::test]
    async fn test_parallel_workers_keep_counts() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver::default());
        let dl = parallel_downloader(dir.path(), fake.clone(), 4).await;

        let summary = dl.run_batch(imgur_posts(8)).await.unwrap();

        assert_eq!(summary.succeeded, 8);
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_parallel_workers() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver {
            fatal_on: Some("p3".into()),
            ..Default::default()
        });
        let dl = parallel_downloader(dir.path(), fake.clone(), 4).await;

        let summary = dl.run_batch(imgur_posts(10)).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(summary.aborted.is_some());
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 3);
        for later in 4..=10 {
            let file = dir.path().join("pics").join(format!("Post_{later}_p{later}.md"));
            assert!(!file.exists(), "{}", file.display());
        }

        let replay = load_as_post_sequence(&summary.ledger).unwrap();
        assert_eq!(replay.len(), 1);
        assert_eq!(replay[0].id, "p3");
    }

    #[tokio::test]
    async fn test_ledger_write_error_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver {
            fail_on: Some("p2".into()),
            ..Default::default()
        });
        let dl = downloader(dir.path(), HostType::Imgur, fake.clone()).await;
        // A directory where the ledger's temporary file goes makes every flush fail.
        std::fs::create_dir_all(dir.path().join("LOG_FILES").join("FAILED.json.tmp")).unwrap();

        let summary = dl.run_batch(imgur_posts(3)).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 2);
        assert!(summary.aborted.is_none());
        assert!(dir.path().join("pics").join("Post_3_p3.md").exists());
    }

    #[tokio::test]
    async fn test_stop_before_run_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeResolver::default());
        let dl = downloader(dir.path(), HostType::Imgur, fake.clone()).await;

        dl.stop();
        let summary = dl.run_batch(imgur_posts(3)).await.unwrap();

        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.aborted.as_deref(), Some(INTERRUPTED));
        assert_eq!(fake.resolve_calls.load(Ordering::SeqCst), 0);
    }
}
