//! Declarative paging settings: filters, sorts, page window
//!
//! These are the wire-facing types a caller (typically an HTTP layer) sends
//! to describe what page of data it wants. They carry no behavior beyond
//! defaults; the compilers in [`crate::core::predicate`] and
//! [`crate::core::sort`] turn them into executable plans.

use serde::{Deserialize, Serialize};

/// How a filter combines with the clauses accumulated before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One declarative filter over a dotted property path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    /// Dotted property path relative to the entity root.
    pub property: String,

    /// Text the field must equal or contain, compared case-insensitively.
    pub value: String,

    /// Equality when true, containment when false.
    #[serde(default)]
    pub exact_match: bool,

    /// How this clause joins the ones before it.
    #[serde(default)]
    pub conjunction: Conjunction,

    /// Pipe-separated alternate paths for the post-fetch pruning pass over a
    /// nested collection, e.g. `"children.label|children.code"`.
    #[serde(default)]
    pub post_filter_path: Option<String>,
}

impl FilterRule {
    /// A case-insensitive containment filter.
    pub fn contains(property: impl Into<String>, value: impl Into<String>) -> Self {
        FilterRule {
            property: property.into(),
            value: value.into(),
            exact_match: false,
            conjunction: Conjunction::default(),
            post_filter_path: None,
        }
    }

    /// A case-insensitive equality filter.
    pub fn exact(property: impl Into<String>, value: impl Into<String>) -> Self {
        FilterRule {
            property: property.into(),
            value: value.into(),
            exact_match: true,
            conjunction: Conjunction::default(),
            post_filter_path: None,
        }
    }

    /// Set the conjunction used to join this clause.
    pub fn joined_by(mut self, conjunction: Conjunction) -> Self {
        self.conjunction = conjunction;
        self
    }

    /// Set the post-fetch pruning path(s) for a nested collection.
    pub fn post_filter(mut self, path: impl Into<String>) -> Self {
        self.post_filter_path = Some(path.into());
        self
    }
}

/// One declarative sort over a dotted property path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortRule {
    /// Dotted property path relative to the entity root.
    pub property: String,

    #[serde(default)]
    pub direction: SortDirection,

    /// When set, this rule reorders a nested collection after fetch instead
    /// of participating in the store-side ordering.
    #[serde(default)]
    pub post_sort_path: Option<String>,
}

impl SortRule {
    pub fn asc(property: impl Into<String>) -> Self {
        SortRule {
            property: property.into(),
            direction: SortDirection::Asc,
            post_sort_path: None,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        SortRule {
            property: property.into(),
            direction: SortDirection::Desc,
            post_sort_path: None,
        }
    }

    /// Set the post-fetch reorder path for a nested collection.
    pub fn post_sort(mut self, path: impl Into<String>) -> Self {
        self.post_sort_path = Some(path.into());
        self
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    20
}

/// The full declarative description of one page request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub filters: Vec<FilterRule>,

    #[serde(default)]
    pub sorts: Vec<SortRule>,

    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// When true, filter clauses are unioned with the repository's extra
    /// filter and the post-fetch pruning pass is skipped.
    #[serde(default)]
    pub search_all_fields: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            filters: Vec::new(),
            sorts: Vec::new(),
            page: default_page(),
            page_size: default_page_size(),
            search_all_fields: false,
        }
    }
}

impl PageRequest {
    /// The page number clamped to 1-based.
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// The page size clamped to at least one row.
    pub fn page_size(&self) -> u64 {
        self.page_size.max(1)
    }

    /// Rows to skip before the requested page starts.
    pub fn offset(&self) -> u64 {
        (self.page() - 1) * self.page_size()
    }
}

/// One page of results plus the total matching count before paging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<E> {
    /// How many entities matched the filters, counted before the page window
    /// was applied.
    pub total_count: u64,

    /// The entities of the requested page.
    pub items: Vec<E>,
}
