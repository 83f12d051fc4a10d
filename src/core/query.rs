//! Executable query description handed to storage backends

use crate::core::entity::Entity;
use crate::core::error::RepoResult;
use crate::core::predicate::Predicate;
use crate::core::sort::SortOrder;
use async_trait::async_trait;

/// A compiled query: an optional predicate, an ordering, and a page window.
///
/// Backends interpret this however suits them; the in-memory store applies
/// it directly, a database adapter would translate it.
pub struct Query<E> {
    pub predicate: Option<Predicate<E>>,
    pub order: SortOrder<E>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<E> Clone for Query<E> {
    fn clone(&self) -> Self {
        Query {
            predicate: self.predicate.clone(),
            order: self.order.clone(),
            skip: self.skip,
            take: self.take,
        }
    }
}

impl<E> Default for Query<E> {
    fn default() -> Self {
        Query {
            predicate: None,
            order: SortOrder::default(),
            skip: None,
            take: None,
        }
    }
}

impl<E: 'static> Query<E> {
    pub fn new() -> Self {
        Query::default()
    }

    /// Narrow the query with another predicate, AND-composed with any
    /// predicate already present.
    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.predicate = Some(match self.predicate {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn order_by(mut self, order: SortOrder<E>) -> Self {
        self.order = order;
        self
    }

    pub fn skip(mut self, count: u64) -> Self {
        self.skip = Some(count);
        self
    }

    pub fn take(mut self, count: u64) -> Self {
        self.take = Some(count);
        self
    }
}

impl<E> std::fmt::Debug for Query<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("filtered", &self.predicate.is_some())
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}

/// A backend able to count and fetch entities for a [`Query`].
#[async_trait]
pub trait QuerySource<E: Entity>: Send + Sync {
    /// Count the entities matching the query's predicate, ignoring the page
    /// window.
    async fn count(&self, query: &Query<E>) -> RepoResult<u64>;

    /// Materialize the entities selected by the query.
    async fn fetch(&self, query: &Query<E>) -> RepoResult<Vec<E>>;
}
