//! # Repokit
//!
//! A generic repository toolkit with a declarative filtering, sorting and
//! paging engine over pluggable storage backends.
//!
//! ## Features
//!
//! - **Repository Contract**: One async CRUD + query trait shared by stores
//!   and decorators
//! - **Declarative Paging**: Filters, sorts and page windows described as
//!   data, compiled into executable plans
//! - **Typed Field Descriptors**: Dotted property paths validated against a
//!   static per-entity shape table
//! - **Pushable vs Deferred**: Store-side predicates and orderings where
//!   possible, in-memory collection pruning and reordering where not
//! - **Global Filter**: An implicit predicate scoping every read on a
//!   repository instance
//! - **Resiliency Decorator**: Bounded retries with a pluggable
//!   transient-failure classifier
//! - **Explicit Composition**: A builder assembling the store and its
//!   add-ons, plus a late-initialized forwarding repository
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use repokit::prelude::*;
//!
//! let repo = InMemoryRepository::new(|order: &Order| order.id)
//!     .with_global_filter(Predicate::new(|order: &Order| !order.archived));
//!
//! let page = repo
//!     .get_paged_data(&PageRequest {
//!         filters: vec![FilterRule::contains("customer.name", "smith")],
//!         sorts: vec![SortRule::desc("placed_at")],
//!         page: 1,
//!         page_size: 20,
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! println!("{} of {} orders", page.items.len(), page.total_count);
//! ```

pub mod addon;
pub mod core;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::{Entity, FieldAccess, FieldDescriptor, FieldKind, ShapeFn, ValueKind},
        error::{RepoError, RepoResult},
        field::FieldValue,
        filter::{
            Conjunction, FilterRule, PageRequest, PageResult, SortDirection, SortRule,
        },
        pager::DataPager,
        predicate::Predicate,
        query::{Query, QuerySource},
        repository::{PagedDataHooks, Repository},
        sort::SortOrder,
    };

    // === Add-ons ===
    pub use crate::addon::{
        builder::RepositoryBuilder,
        proxy::LazyRepository,
        resiliency::{Backoff, ResilientRepository, RetryPolicy},
    };

    // === Storage ===
    pub use crate::storage::InMemoryRepository;

    // === External Dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
