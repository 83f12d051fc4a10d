//! The repository contract

use crate::core::entity::Entity;
use crate::core::error::RepoResult;
use crate::core::filter::{PageRequest, PageResult};
use crate::core::predicate::Predicate;
use crate::core::sort::SortOrder;
use async_trait::async_trait;

/// Data access contract over a keyed entity collection.
///
/// `K` is the key type, `E` the entity type. Implementations include the
/// in-memory store, the resiliency decorator, and the late-initialized
/// forwarding repository; all are interchangeable behind this trait.
#[async_trait]
pub trait Repository<K, E>: Send + Sync
where
    K: Clone + Send + Sync + 'static,
    E: Entity,
{
    /// Fetch one entity by key. Reads are scoped by the global filter when
    /// the backing store carries one.
    async fn get(&self, key: &K) -> RepoResult<Option<E>>;

    /// Add a new entity.
    async fn insert(&self, entity: E) -> RepoResult<()>;

    /// Replace the stored entity carrying the same key.
    async fn update(&self, entity: E) -> RepoResult<()>;

    /// Remove the entity with the given key. Removing an absent key is a
    /// no-op.
    async fn delete(&self, key: &K) -> RepoResult<()>;

    /// Remove the given entity by its key.
    async fn delete_entity(&self, entity: E) -> RepoResult<()>;

    /// Ad-hoc query escape hatch: optional predicate, optional ordering,
    /// and eager-load hints for backends that support them.
    async fn list(
        &self,
        filter: Option<Predicate<E>>,
        order: Option<SortOrder<E>>,
        include_paths: &[&str],
    ) -> RepoResult<Vec<E>>;

    /// Every entity visible through the global filter.
    async fn list_all(&self) -> RepoResult<Vec<E>>;

    /// The governed, declarative query path.
    async fn get_paged_data(&self, settings: &PageRequest) -> RepoResult<PageResult<E>>;
}

/// Per-request filter hooks consumed by the paging path.
///
/// Stores override these to scope reads (`precondition_filter`) or widen
/// them (`extra_filter`) based on the incoming request.
pub trait PagedDataHooks<E: Entity> {
    /// A predicate applied to every paged read, before the request's own
    /// filters.
    fn precondition_filter(&self, _settings: &PageRequest) -> Option<Predicate<E>> {
        None
    }

    /// A predicate merged with the request's filters: unioned when the
    /// request sets `search_all_fields`, intersected otherwise.
    fn extra_filter(&self, _settings: &PageRequest) -> Option<Predicate<E>> {
        None
    }
}
