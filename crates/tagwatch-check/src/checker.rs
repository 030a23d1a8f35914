//! Bounded concurrent update checking

use crate::outcome::CheckOutcome;
use crate::remote::RemoteDigestLookup;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tagwatch_docker::{LocalDigestProvider, RunningContainer};
use tagwatch_image::{compare, ImageReference, RegistryFamily};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Checks in flight when no bound is configured
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Checks running containers against their registries
pub struct UpdateChecker {
    remote: Arc<dyn RemoteDigestLookup>,
    local: Arc<dyn LocalDigestProvider>,
    concurrency: usize,
}

impl UpdateChecker {
    pub fn new(remote: Arc<dyn RemoteDigestLookup>, local: Arc<dyn LocalDigestProvider>) -> Self {
        Self {
            remote,
            local,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit the number of checks in flight; zero is treated as one
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Check one container. Never fails: every problem becomes an unverifiable outcome.
    pub async fn check(&self, container: &RunningContainer) -> CheckOutcome {
        let reference = ImageReference::parse(&container.image);
        debug!(
            "Checking {} ({}) via {}",
            container.name,
            reference,
            RegistryFamily::of(&reference)
        );

        let (local, remote) = tokio::join!(
            self.local.local_digest(&container.image),
            self.remote.remote_digest(&reference)
        );

        let mut details = Vec::new();

        let local_digest = match local {
            Ok(digest) => digest,
            Err(e) => {
                warn!("Local digest lookup failed for {}: {}", container.image, e);
                details.push(e.to_string());
                None
            }
        };

        let (remote_digest, digest_source) = match remote {
            Ok(resolved) => (Some(resolved.digest), Some(resolved.source)),
            Err(e) if e.is_unreachable() => {
                warn!("Registry {} unreachable: {}", reference.registry, e);
                details.push(e.to_string());
                (None, None)
            }
            Err(e) => {
                debug!("Remote digest lookup failed for {}: {}", reference, e);
                details.push(e.to_string());
                (None, None)
            }
        };

        let verdict = compare(
            local_digest.as_ref(),
            remote_digest.as_ref(),
            &reference.registry,
        );

        CheckOutcome {
            container_name: container.name.clone(),
            image: container.image.clone(),
            image_reference: reference.to_string(),
            local_digest,
            remote_digest,
            status: verdict.status,
            reason: verdict.reason,
            detail: (!details.is_empty()).then(|| details.join("; ")),
            digest_source,
        }
    }

    /// Check every container and return outcomes in input order
    pub async fn check_all(&self, containers: Vec<RunningContainer>) -> Vec<CheckOutcome> {
        self.check_all_with(containers, |_| {}).await
    }

    /// Like [`check_all`](Self::check_all), calling `on_done` as each check finishes
    pub async fn check_all_with<F>(
        &self,
        containers: Vec<RunningContainer>,
        mut on_done: F,
    ) -> Vec<CheckOutcome>
    where
        F: FnMut(&CheckOutcome),
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut futures = FuturesUnordered::new();

        for (index, container) in containers.iter().enumerate() {
            let sem = semaphore.clone();
            futures.push(async move {
                let _permit = sem.acquire().await.ok();
                (index, self.check(container).await)
            });
        }

        let mut outcomes = Vec::with_capacity(containers.len());
        while let Some((index, outcome)) = futures.next().await {
            on_done(&outcome);
            outcomes.push((index, outcome));
        }

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tagwatch_docker::EngineError;
    use tagwatch_image::{
        DigestSource, DigestValue, RegistryError, ResolvedDigest, UpdateStatus,
    };

    #[derive(Default)]
    struct FakeLocal {
        digests: HashMap<String, String>,
    }

    #[async_trait]
    impl LocalDigestProvider for FakeLocal {
        async fn local_digest(&self, image: &str) -> tagwatch_docker::Result<Option<DigestValue>> {
            if image == "broken" {
                return Err(EngineError::CommandFailed {
                    command: "docker image inspect".to_string(),
                    stderr: "daemon down".to_string(),
                });
            }
            Ok(self.digests.get(image).map(DigestValue::new))
        }
    }

    /// Keyed by normalized reference; tracks the peak number of lookups in flight
    #[derive(Default)]
    struct FakeRemote {
        digests: HashMap<String, String>,
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl RemoteDigestLookup for FakeRemote {
        async fn remote_digest(
            &self,
            reference: &ImageReference,
        ) -> tagwatch_image::Result<ResolvedDigest> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.digests.get(&reference.to_string()) {
                Some(d) => Ok(ResolvedDigest {
                    digest: DigestValue::new(d),
                    source: DigestSource::Header,
                }),
                None => Err(RegistryError::Timeout {
                    url: format!("https://{}/v2/", reference.registry),
                }),
            }
        }
    }

    fn checker(local: FakeLocal, remote: Arc<FakeRemote>) -> UpdateChecker {
        UpdateChecker::new(remote, Arc::new(local))
    }

    #[tokio::test]
    async fn test_local_failure_is_unverifiable() {
        let remote = Arc::new(FakeRemote {
            digests: HashMap::from([(
                "docker.io/library/broken:latest".to_string(),
                "sha256:aaaa".to_string(),
            )]),
            ..Default::default()
        });
        let outcome = checker(FakeLocal::default(), remote)
            .check(&RunningContainer::new("b", "broken"))
            .await;

        assert_eq!(outcome.status, UpdateStatus::Unverifiable);
        assert_eq!(outcome.reason.as_deref(), Some("no local digest"));
        assert!(outcome.detail.unwrap().contains("daemon down"));
        assert_eq!(outcome.remote_digest, Some(DigestValue::new("sha256:aaaa")));
    }

    #[tokio::test]
    async fn test_unreachable_registry_keeps_local_digest() {
        let local = FakeLocal {
            digests: HashMap::from([("nginx".to_string(), "sha256:aaaa".to_string())]),
        };
        let outcome = checker(local, Arc::new(FakeRemote::default()))
            .check(&RunningContainer::new("web", "nginx"))
            .await;

        assert_eq!(outcome.status, UpdateStatus::Unverifiable);
        assert_eq!(outcome.reason.as_deref(), Some("registry unreachable: docker.io"));
        assert_eq!(outcome.local_digest, Some(DigestValue::new("sha256:aaaa")));
        assert!(outcome.detail.is_some());
        assert_eq!(outcome.digest_source, None);
    }

    #[tokio::test]
    async fn test_check_all_preserves_input_order() {
        let names = ["a", "b", "c", "d", "e", "f"];
        let local = FakeLocal {
            digests: names
                .iter()
                .map(|n| (n.to_string(), "sha256:1".to_string()))
                .collect(),
        };
        let remote = Arc::new(FakeRemote {
            digests: names
                .iter()
                .map(|n| (format!("docker.io/library/{}:latest", n), "sha256:1".to_string()))
                .collect(),
            delay: Duration::from_millis(10),
            ..Default::default()
        });

        let containers = names.iter().map(|n| RunningContainer::new(*n, *n)).collect();
        let mut completed = 0;
        let outcomes = checker(local, remote)
            .check_all_with(containers, |_| completed += 1)
            .await;

        assert_eq!(completed, names.len());
        let order: Vec<&str> = outcomes.iter().map(|o| o.container_name.as_str()).collect();
        assert_eq!(order, names);
        assert!(outcomes.iter().all(|o| o.status == UpdateStatus::UpToDate));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let remote = Arc::new(FakeRemote {
            delay: Duration::from_millis(20),
            ..Default::default()
        });
        let containers = (0..10)
            .map(|i| RunningContainer::new(format!("c{i}"), format!("img{i}")))
            .collect();

        let outcomes = checker(FakeLocal::default(), remote.clone())
            .with_concurrency(2)
            .check_all(containers)
            .await;

        assert_eq!(outcomes.len(), 10);
        assert!(remote.peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        let checker = checker(FakeLocal::default(), Arc::new(FakeRemote::default()));
        assert_eq!(checker.with_concurrency(0).concurrency(), 1);
    }
}
