//! Explicit composition of a repository and its add-ons

use crate::addon::resiliency::{ResilientRepository, RetryPolicy};
use crate::core::entity::Entity;
use crate::core::error::{RepoError, RepoResult};
use crate::core::repository::Repository;
use std::sync::Arc;

/// Composes a base repository with optional decorators.
///
/// Decorators apply in the order they are requested, each wrapping the
/// value built so far. Building without a base instance is a configuration
/// error.
pub struct RepositoryBuilder<K, E> {
    base: Option<Arc<dyn Repository<K, E>>>,
    resiliency: Option<RetryPolicy>,
}

impl<K, E> Default for RepositoryBuilder<K, E> {
    fn default() -> Self {
        RepositoryBuilder {
            base: None,
            resiliency: None,
        }
    }
}

impl<K, E> RepositoryBuilder<K, E>
where
    K: Clone + Send + Sync + 'static,
    E: Entity,
{
    pub fn new() -> Self {
        RepositoryBuilder::default()
    }

    /// Set the concrete storage adapter everything else wraps.
    pub fn base(mut self, base: Arc<dyn Repository<K, E>>) -> Self {
        self.base = Some(base);
        self
    }

    /// Wrap the composition with the retry decorator.
    pub fn with_resiliency(mut self, policy: RetryPolicy) -> Self {
        self.resiliency = Some(policy);
        self
    }

    /// Finish the composition.
    pub fn build(self) -> RepoResult<Arc<dyn Repository<K, E>>> {
        let mut repository = self.base.ok_or_else(|| {
            RepoError::configuration("no base repository instance was provided to the builder")
        })?;

        if let Some(policy) = self.resiliency {
            repository = Arc::new(ResilientRepository::new(repository, policy));
        }

        Ok(repository)
    }
}

impl<K, E> std::fmt::Debug for RepositoryBuilder<K, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryBuilder")
            .field("has_base", &self.base.is_some())
            .field("resiliency", &self.resiliency)
            .finish()
    }
}
