//! Retry decorator for transient store failures
//!
//! [`ResilientRepository`] wraps any [`Repository`] and re-runs failed
//! operations under a [`RetryPolicy`]. Configuration errors are never
//! retried; everything else is retried while the policy's classifier
//! accepts it, then the original failure surfaces.

use crate::core::entity::Entity;
use crate::core::error::{RepoError, RepoResult};
use crate::core::filter::{PageRequest, PageResult};
use crate::core::predicate::Predicate;
use crate::core::repository::Repository;
use crate::core::sort::SortOrder;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How the delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay doubles after each failed attempt.
    Exponential,
}

/// Bounded-retry policy with a pluggable transient-failure classifier.
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
    backoff: Backoff,
    classify: Arc<dyn Fn(&RepoError) -> bool + Send + Sync>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 2,
            delay: Duration::from_millis(500),
            backoff: Backoff::default(),
            classify: Arc::new(|_| true),
        }
    }
}

impl Clone for RetryPolicy {
    fn clone(&self) -> Self {
        RetryPolicy {
            retries: self.retries,
            delay: self.delay,
            backoff: self.backoff,
            classify: Arc::clone(&self.classify),
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("retries", &self.retries)
            .field("delay", &self.delay)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        RetryPolicy::default()
    }

    /// How many additional attempts follow the first failure.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the transient-failure classifier. Configuration errors are
    /// excluded regardless of what the classifier says.
    pub fn retry_when(
        mut self,
        classify: impl Fn(&RepoError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.classify = Arc::new(classify);
        self
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    fn is_transient(&self, err: &RepoError) -> bool {
        !err.is_configuration() && (self.classify)(err)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => self.delay * 2u32.saturating_pow(attempt),
        }
    }
}

/// A [`Repository`] decorator retrying transient failures.
pub struct ResilientRepository<K, E> {
    inner: Arc<dyn Repository<K, E>>,
    policy: RetryPolicy,
}

impl<K, E> ResilientRepository<K, E>
where
    K: Clone + Send + Sync + 'static,
    E: Entity,
{
    pub fn new(inner: Arc<dyn Repository<K, E>>, policy: RetryPolicy) -> Self {
        ResilientRepository { inner, policy }
    }

    /// Run `operation` with bounded retries under the policy.
    async fn execute<T, F, Fut>(&self, operation: F) -> RepoResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RepoResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.policy.retries || !self.policy.is_transient(&err) {
                        return Err(err);
                    }
                    warn!(
                        attempt = attempt + 1,
                        error = %err,
                        "repository operation failed, retrying"
                    );
                    tokio::time::sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<K, E> Repository<K, E> for ResilientRepository<K, E>
where
    K: Clone + Send + Sync + 'static,
    E: Entity,
{
    async fn get(&self, key: &K) -> RepoResult<Option<E>> {
        self.execute(|| self.inner.get(key)).await
    }

    async fn insert(&self, entity: E) -> RepoResult<()> {
        self.execute(|| self.inner.insert(entity.clone())).await
    }

    async fn update(&self, entity: E) -> RepoResult<()> {
        self.execute(|| self.inner.update(entity.clone())).await
    }

    async fn delete(&self, key: &K) -> RepoResult<()> {
        self.execute(|| self.inner.delete(key)).await
    }

    async fn delete_entity(&self, entity: E) -> RepoResult<()> {
        self.execute(|| self.inner.delete_entity(entity.clone()))
            .await
    }

    async fn list(
        &self,
        filter: Option<Predicate<E>>,
        order: Option<SortOrder<E>>,
        include_paths: &[&str],
    ) -> RepoResult<Vec<E>> {
        self.execute(|| self.inner.list(filter.clone(), order.clone(), include_paths))
            .await
    }

    async fn list_all(&self) -> RepoResult<Vec<E>> {
        self.execute(|| self.inner.list_all()).await
    }

    async fn get_paged_data(&self, settings: &PageRequest) -> RepoResult<PageResult<E>> {
        self.execute(|| self.inner.get_paged_data(settings)).await
    }
}
