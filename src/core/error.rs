//! Typed error handling for repository operations
//!
//! All fallible operations in this crate return [`RepoError`]. The variants
//! map to distinct failure policies:
//!
//! - [`RepoError::Configuration`]: invalid filter/sort paths, a builder with
//!   no base instance, and similar caller mistakes. Raised before any store
//!   access, never retried, never swallowed.
//! - [`RepoError::NotInitialized`]: a forwarding repository was used before
//!   its target was injected.
//! - [`RepoError::Paging`]: a store failure caught at the paging boundary,
//!   wrapped with the entity type for context.
//! - [`RepoError::Store`]: a raw backend failure, retryable when routed
//!   through the resiliency decorator.

use std::fmt;

/// The error type for all repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Invalid configuration supplied by the caller (bad filter/sort path
    /// depth, builder without a base instance, double initialization).
    Configuration { message: String },

    /// A forwarding repository was used before `initialize` was called.
    NotInitialized,

    /// No entity with the given key exists.
    NotFound { entity: &'static str, key: String },

    /// An entity with the given key already exists.
    Conflict { entity: &'static str, key: String },

    /// A failure while paging the data source, wrapped with entity context.
    Paging {
        entity: &'static str,
        source: Box<RepoError>,
    },

    /// A storage backend failure.
    Store {
        backend: &'static str,
        source: anyhow::Error,
    },
}

impl RepoError {
    /// Shorthand for a [`RepoError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        RepoError::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a [`RepoError::Store`] error.
    pub fn store(backend: &'static str, source: anyhow::Error) -> Self {
        RepoError::Store { backend, source }
    }

    /// True for errors that must fail fast and never be retried.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RepoError::Configuration { .. } | RepoError::NotInitialized
        )
    }
}

impl fmt::Display for RepoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoError::Configuration { message } => {
                write!(f, "configuration error: {}", message)
            }
            RepoError::NotInitialized => {
                write!(f, "repository internals were not initialized")
            }
            RepoError::NotFound { entity, key } => {
                write!(f, "{} with key '{}' not found", entity, key)
            }
            RepoError::Conflict { entity, key } => {
                write!(f, "{} with key '{}' already exists", entity, key)
            }
            RepoError::Paging { entity, source } => {
                write!(
                    f,
                    "there was an error paging the data source for entity {}: {}",
                    entity, source
                )
            }
            RepoError::Store { backend, source } => {
                write!(f, "{} storage error: {}", backend, source)
            }
        }
    }
}

impl std::error::Error for RepoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepoError::Paging { source, .. } => Some(source.as_ref()),
            RepoError::Store { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// A specialized Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
