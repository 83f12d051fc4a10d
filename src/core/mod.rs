//! Core query engine: entities, compiled filters and sorts, the paging
//! executor, and the repository contract.

pub mod entity;
pub mod error;
pub mod field;
pub mod filter;
pub mod pager;
pub mod path;
pub mod predicate;
pub mod query;
pub mod repository;
pub mod sort;

#[cfg(test)]
pub(crate) mod fixture;
