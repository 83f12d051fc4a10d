//! Late-initialized forwarding repository
//!
//! [`LazyRepository`] is handed out before its backing store exists and
//! starts forwarding once [`LazyRepository::initialize`] injects the
//! target. Every operation before that fails with
//! [`RepoError::NotInitialized`]; initializing twice is a configuration
//! error.

use crate::core::entity::Entity;
use crate::core::error::{RepoError, RepoResult};
use crate::core::filter::{PageRequest, PageResult};
use crate::core::predicate::Predicate;
use crate::core::repository::Repository;
use crate::core::sort::SortOrder;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::OnceLock;

/// A repository shell whose target is injected after construction.
pub struct LazyRepository<K, E> {
    target: OnceLock<Arc<dyn Repository<K, E>>>,
}

impl<K, E> Default for LazyRepository<K, E> {
    fn default() -> Self {
        LazyRepository {
            target: OnceLock::new(),
        }
    }
}

impl<K, E> std::fmt::Debug for LazyRepository<K, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyRepository")
            .field("initialized", &self.target.get().is_some())
            .finish()
    }
}

impl<K, E> LazyRepository<K, E>
where
    K: Clone + Send + Sync + 'static,
    E: Entity,
{
    pub fn new() -> Self {
        LazyRepository::default()
    }

    /// Inject the forwarding target. Fails when already initialized.
    pub fn initialize(&self, target: Arc<dyn Repository<K, E>>) -> RepoResult<()> {
        self.target
            .set(target)
            .map_err(|_| RepoError::configuration("repository target was already initialized"))
    }

    pub fn is_initialized(&self) -> bool {
        self.target.get().is_some()
    }

    fn target(&self) -> RepoResult<&Arc<dyn Repository<K, E>>> {
        self.target.get().ok_or(RepoError::NotInitialized)
    }
}

#[async_trait]
impl<K, E> Repository<K, E> for LazyRepository<K, E>
where
    K: Clone + Send + Sync + 'static,
    E: Entity,
{
    async fn get(&self, key: &K) -> RepoResult<Option<E>> {
        self.target()?.get(key).await
    }

    async fn insert(&self, entity: E) -> RepoResult<()> {
        self.target()?.insert(entity).await
    }

    async fn update(&self, entity: E) -> RepoResult<()> {
        self.target()?.update(entity).await
    }

    async fn delete(&self, key: &K) -> RepoResult<()> {
        self.target()?.delete(key).await
    }

    async fn delete_entity(&self, entity: E) -> RepoResult<()> {
        self.target()?.delete_entity(entity).await
    }

    async fn list(
        &self,
        filter: Option<Predicate<E>>,
        order: Option<SortOrder<E>>,
        include_paths: &[&str],
    ) -> RepoResult<Vec<E>> {
        self.target()?.list(filter, order, include_paths).await
    }

    async fn list_all(&self) -> RepoResult<Vec<E>> {
        self.target()?.list_all().await
    }

    async fn get_paged_data(&self, settings: &PageRequest) -> RepoResult<PageResult<E>> {
        self.target()?.get_paged_data(settings).await
    }
}
