//! The paging executor
//!
//! [`DataPager`] orchestrates one governed page read: compile the request's
//! filters and sorts, run the pushable parts against the backend, count
//! before windowing, then apply the deferred collection passes to the
//! fetched page. Store failures are wrapped with the entity type for
//! context; configuration errors surface unchanged.

use crate::core::entity::{Entity, entity_name};
use crate::core::error::{RepoError, RepoResult};
use crate::core::filter::{PageRequest, PageResult};
use crate::core::predicate::{self, Predicate, compile_filters};
use crate::core::query::{Query, QuerySource};
use crate::core::sort::compile_sorts;
use std::marker::PhantomData;
use tracing::debug;

/// Date format used to interpret filter values against date-typed fields.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Executes declarative page requests against a [`QuerySource`].
pub struct DataPager<E> {
    date_format: String,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Clone for DataPager<E> {
    fn clone(&self) -> Self {
        DataPager {
            date_format: self.date_format.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E> Default for DataPager<E> {
    fn default() -> Self {
        DataPager {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            _marker: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for DataPager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPager")
            .field("date_format", &self.date_format)
            .finish()
    }
}

impl<E: Entity> DataPager<E> {
    pub fn new() -> Self {
        DataPager::default()
    }

    /// Override the chrono format used for date-valued filters.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Execute one page request.
    ///
    /// `precondition` scopes every read (the repository's global filter);
    /// `extra` is merged with the request's own filters, OR-ed when the
    /// request sets `search_all_fields`, AND-ed otherwise. The total count
    /// is taken before the page window is applied.
    pub async fn get_paged_data(
        &self,
        source: &dyn QuerySource<E>,
        settings: &PageRequest,
        precondition: Option<Predicate<E>>,
        extra: Option<Predicate<E>>,
    ) -> RepoResult<PageResult<E>> {
        let filter_plan = compile_filters::<E>(settings, &self.date_format)?;
        let sort_plan = compile_sorts::<E>(settings)?;

        let merged = predicate::merge(filter_plan.predicate, extra, settings.search_all_fields);

        let mut query = Query::new().order_by(sort_plan.order);
        if let Some(precondition) = precondition {
            query = query.filter(precondition);
        }
        if let Some(merged) = merged {
            query = query.filter(merged);
        }

        let total_count = source.count(&query).await.map_err(wrap_store::<E>)?;

        let page_query = query.skip(settings.offset()).take(settings.page_size());
        let mut items = source.fetch(&page_query).await.map_err(wrap_store::<E>)?;

        debug!(
            entity = entity_name::<E>(),
            total_count,
            returned = items.len(),
            page = settings.page(),
            "paged data fetched"
        );

        for item in &mut items {
            for prune in &filter_plan.deferred {
                item.retain_in_collection(&prune.collection, &mut |element| {
                    (prune.keep)(element)
                });
            }
            for sort in &sort_plan.deferred {
                item.sort_collection(&sort.collection, &mut |left, right| {
                    (sort.compare)(left, right)
                });
            }
        }

        Ok(PageResult { total_count, items })
    }
}

/// Wrap backend failures with entity context; configuration errors pass
/// through untouched.
fn wrap_store<E>(err: RepoError) -> RepoError {
    if err.is_configuration() {
        return err;
    }
    RepoError::Paging {
        entity: entity_name::<E>(),
        source: Box::new(err),
    }
}
