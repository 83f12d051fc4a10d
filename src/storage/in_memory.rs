//! In-memory repository implementation for testing and development

use crate::core::entity::{Entity, entity_name};
use crate::core::error::{RepoError, RepoResult};
use crate::core::filter::{PageRequest, PageResult};
use crate::core::pager::DataPager;
use crate::core::predicate::{self, Predicate};
use crate::core::query::{Query, QuerySource};
use crate::core::repository::{PagedDataHooks, Repository};
use crate::core::sort::SortOrder;
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Hook producing a per-request predicate.
type HookFn<E> = Arc<dyn Fn(&PageRequest) -> Option<Predicate<E>> + Send + Sync>;

/// In-memory repository over a keyed entity collection
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// The global filter, when present, scopes every read; writes are
/// unaffected by it.
pub struct InMemoryRepository<K, E> {
    items: Arc<RwLock<Vec<E>>>,
    key_of: fn(&E) -> K,
    global_filter: Option<Predicate<E>>,
    precondition: Option<HookFn<E>>,
    extra: Option<HookFn<E>>,
    pager: DataPager<E>,
}

impl<K, E> Clone for InMemoryRepository<K, E> {
    fn clone(&self) -> Self {
        InMemoryRepository {
            items: Arc::clone(&self.items),
            key_of: self.key_of,
            global_filter: self.global_filter.clone(),
            precondition: self.precondition.clone(),
            extra: self.extra.clone(),
            pager: self.pager.clone(),
        }
    }
}

impl<K, E> InMemoryRepository<K, E>
where
    K: Clone + PartialEq + ToString + Send + Sync + 'static,
    E: Entity,
{
    /// Create an empty repository. `key_of` extracts the key each entity is
    /// stored under.
    pub fn new(key_of: fn(&E) -> K) -> Self {
        InMemoryRepository {
            items: Arc::new(RwLock::new(Vec::new())),
            key_of,
            global_filter: None,
            precondition: None,
            extra: None,
            pager: DataPager::new(),
        }
    }

    /// Seed the repository with initial entities.
    pub fn with_items(self, items: Vec<E>) -> Self {
        InMemoryRepository {
            items: Arc::new(RwLock::new(items)),
            ..self
        }
    }

    /// Scope every read with a predicate, set once at construction.
    pub fn with_global_filter(mut self, filter: Predicate<E>) -> Self {
        self.global_filter = Some(filter);
        self
    }

    /// Install the precondition hook consumed by the paging path.
    pub fn with_precondition_filter(
        mut self,
        hook: impl Fn(&PageRequest) -> Option<Predicate<E>> + Send + Sync + 'static,
    ) -> Self {
        self.precondition = Some(Arc::new(hook));
        self
    }

    /// Install the extra-filter hook consumed by the paging path.
    pub fn with_extra_filter(
        mut self,
        hook: impl Fn(&PageRequest) -> Option<Predicate<E>> + Send + Sync + 'static,
    ) -> Self {
        self.extra = Some(Arc::new(hook));
        self
    }

    /// Override the date format used for date-valued filters.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.pager = self.pager.with_date_format(format);
        self
    }

    /// Every entity visible through the global filter, cloned out of the
    /// store.
    fn scoped(&self) -> RepoResult<Vec<E>> {
        let items = self
            .items
            .read()
            .map_err(|e| RepoError::store("in-memory", anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(items
            .iter()
            .filter(|item| self.visible(item))
            .cloned()
            .collect())
    }

    fn visible(&self, entity: &E) -> bool {
        match &self.global_filter {
            Some(filter) => filter.test(entity),
            None => true,
        }
    }
}

#[async_trait]
impl<K, E> Repository<K, E> for InMemoryRepository<K, E>
where
    K: Clone + PartialEq + ToString + Send + Sync + 'static,
    E: Entity,
{
    async fn get(&self, key: &K) -> RepoResult<Option<E>> {
        let items = self.scoped()?;
        Ok(items.into_iter().find(|item| (self.key_of)(item) == *key))
    }

    async fn insert(&self, entity: E) -> RepoResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepoError::store("in-memory", anyhow!("failed to acquire write lock: {}", e)))?;

        let key = (self.key_of)(&entity);
        if items.iter().any(|item| (self.key_of)(item) == key) {
            return Err(RepoError::Conflict {
                entity: entity_name::<E>(),
                key: key.to_string(),
            });
        }

        items.push(entity);
        Ok(())
    }

    async fn update(&self, entity: E) -> RepoResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepoError::store("in-memory", anyhow!("failed to acquire write lock: {}", e)))?;

        let key = (self.key_of)(&entity);
        let position = items
            .iter()
            .position(|item| (self.key_of)(item) == key)
            .ok_or_else(|| RepoError::NotFound {
                entity: entity_name::<E>(),
                key: key.to_string(),
            })?;

        items[position] = entity;
        Ok(())
    }

    async fn delete(&self, key: &K) -> RepoResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| RepoError::store("in-memory", anyhow!("failed to acquire write lock: {}", e)))?;

        // Removing an absent key is a no-op.
        items.retain(|item| (self.key_of)(item) != *key);
        Ok(())
    }

    async fn delete_entity(&self, entity: E) -> RepoResult<()> {
        let key = (self.key_of)(&entity);
        self.delete(&key).await
    }

    async fn list(
        &self,
        filter: Option<Predicate<E>>,
        order: Option<SortOrder<E>>,
        _include_paths: &[&str],
    ) -> RepoResult<Vec<E>> {
        let mut items = self.scoped()?;
        if let Some(filter) = filter {
            items.retain(|item| filter.test(item));
        }
        if let Some(order) = order {
            items.sort_by(|a, b| order.compare(a, b));
        }
        Ok(items)
    }

    async fn list_all(&self) -> RepoResult<Vec<E>> {
        self.scoped()
    }

    async fn get_paged_data(&self, settings: &PageRequest) -> RepoResult<PageResult<E>> {
        let precondition = self.precondition_filter(settings);
        let extra = self.extra_filter(settings);
        self.pager
            .get_paged_data(self, settings, precondition, extra)
            .await
    }
}

impl<K, E> PagedDataHooks<E> for InMemoryRepository<K, E>
where
    K: Clone + PartialEq + ToString + Send + Sync + 'static,
    E: Entity,
{
    fn precondition_filter(&self, settings: &PageRequest) -> Option<Predicate<E>> {
        let hooked = self.precondition.as_ref().and_then(|hook| hook(settings));
        predicate::merge(self.global_filter.clone(), hooked, false)
    }

    fn extra_filter(&self, settings: &PageRequest) -> Option<Predicate<E>> {
        self.extra.as_ref().and_then(|hook| hook(settings))
    }
}

#[async_trait]
impl<K, E> QuerySource<E> for InMemoryRepository<K, E>
where
    K: Clone + PartialEq + ToString + Send + Sync + 'static,
    E: Entity,
{
    async fn count(&self, query: &Query<E>) -> RepoResult<u64> {
        let items = self
            .items
            .read()
            .map_err(|e| RepoError::store("in-memory", anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(items
            .iter()
            .filter(|item| match &query.predicate {
                Some(predicate) => predicate.test(item),
                None => true,
            })
            .count() as u64)
    }

    async fn fetch(&self, query: &Query<E>) -> RepoResult<Vec<E>> {
        let items = self
            .items
            .read()
            .map_err(|e| RepoError::store("in-memory", anyhow!("failed to acquire read lock: {}", e)))?;

        let mut selected: Vec<E> = items
            .iter()
            .filter(|item| match &query.predicate {
                Some(predicate) => predicate.test(item),
                None => true,
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| query.order.compare(a, b));

        let skip = query.skip.unwrap_or(0) as usize;
        let take = query.take.map(|n| n as usize).unwrap_or(usize::MAX);
        Ok(selected.into_iter().skip(skip).take(take).collect())
    }
}
