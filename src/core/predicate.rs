//! Predicate combinators and the filter compiler
//!
//! A [`Predicate`] is a cloneable, shareable test over one entity. The
//! compiler in [`compile_filters`] turns declarative [`FilterRule`]s into a
//! [`FilterPlan`]: a store-side predicate for clauses that can run before
//! paging, plus deferred pruning passes for clauses that reshape nested
//! collections after the page is fetched.

use crate::core::entity::{Entity, FieldAccess, ValueKind};
use crate::core::error::{RepoError, RepoResult};
use crate::core::field::FieldValue;
use crate::core::filter::{Conjunction, FilterRule, PageRequest};
use crate::core::path::{self, ResolvedPath};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;

/// A composable boolean test over an entity.
pub struct Predicate<E> {
    test: Arc<dyn Fn(&E) -> bool + Send + Sync>,
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Predicate {
            test: Arc::clone(&self.test),
        }
    }
}

impl<E> Predicate<E> {
    pub fn new(test: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Predicate {
            test: Arc::new(test),
        }
    }

    /// Evaluate the predicate against one entity.
    pub fn test(&self, entity: &E) -> bool {
        (self.test)(entity)
    }

    /// Both predicates must hold.
    pub fn and(self, other: Predicate<E>) -> Predicate<E>
    where
        E: 'static,
    {
        Predicate::new(move |entity| self.test(entity) && other.test(entity))
    }

    /// Either predicate may hold.
    pub fn or(self, other: Predicate<E>) -> Predicate<E>
    where
        E: 'static,
    {
        Predicate::new(move |entity| self.test(entity) || other.test(entity))
    }
}

impl<E> std::fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate")
    }
}

/// Combine an optional compiled filter with an optional extra filter.
///
/// `union` selects OR instead of the default AND; either side being absent
/// yields the other unchanged.
pub fn merge<E: 'static>(
    base: Option<Predicate<E>>,
    extra: Option<Predicate<E>>,
    union: bool,
) -> Option<Predicate<E>> {
    match (base, extra) {
        (Some(base), Some(extra)) => Some(if union {
            base.or(extra)
        } else {
            base.and(extra)
        }),
        (Some(base), None) => Some(base),
        (None, Some(extra)) => Some(extra),
        (None, None) => None,
    }
}

/// A deferred pruning pass over one nested collection of each fetched entity.
pub struct CollectionPrune {
    /// Name of the collection field on the entity.
    pub collection: String,
    /// Keep an element when this returns true.
    pub keep: Arc<dyn Fn(&dyn FieldAccess) -> bool + Send + Sync>,
}

impl std::fmt::Debug for CollectionPrune {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionPrune")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

/// The compiled form of a request's filters.
#[derive(Debug)]
pub struct FilterPlan<E> {
    /// Store-side predicate, absent when no filter clause was usable.
    pub predicate: Option<Predicate<E>>,
    /// Post-fetch pruning passes, one per targeted collection.
    pub deferred: Vec<CollectionPrune>,
}

/// A test over a single field value, prepared once per filter rule.
type ValueTest = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// Build the per-value test for a rule, honoring the leaf kind.
///
/// Date-typed fields compare by calendar date: the rule value is parsed with
/// `date_format` and an unparseable value disables the rule (`None`) rather
/// than failing the request. Every other kind compares case-insensitively on
/// the rendered text.
fn value_test(
    kind: ValueKind,
    value: &str,
    exact_match: bool,
    date_format: &str,
) -> Option<ValueTest> {
    if kind == ValueKind::DateTime {
        let date = match NaiveDate::parse_from_str(value, date_format) {
            Ok(date) => date,
            Err(err) => {
                trace!(value, %err, "unparseable date in filter, ignoring rule");
                return None;
            }
        };
        return Some(Arc::new(move |field| field.is_on_date(date)));
    }

    let needle = value.to_uppercase();
    Some(Arc::new(move |field| field.matches(&needle, exact_match)))
}

/// Validate crossing depth for a resolved filter/sort path.
fn check_crossings(property: &str, resolved: &ResolvedPath) -> RepoResult<()> {
    if resolved.collection_crossings > 1 {
        return Err(RepoError::configuration(format!(
            "property path '{}' crosses more than one collection",
            property
        )));
    }
    if resolved.collection_crossings == 1 && resolved.crossed_at != Some(0) {
        return Err(RepoError::configuration(format!(
            "property path '{}' crosses a collection below the first segment",
            property
        )));
    }
    Ok(())
}

/// Compile the request's filters into a [`FilterPlan`].
///
/// Rules are deduplicated by property (first occurrence wins) and joined
/// left to right using each rule's own conjunction. Unknown properties are
/// ignored; paths that reach too deep into collections are configuration
/// errors. The deferred passes are skipped entirely when
/// `search_all_fields` is set.
pub fn compile_filters<E: Entity>(
    settings: &PageRequest,
    date_format: &str,
) -> RepoResult<FilterPlan<E>> {
    let mut unique: IndexMap<&str, &FilterRule> = IndexMap::new();
    for rule in &settings.filters {
        if rule.property.is_empty() || rule.value.is_empty() {
            continue;
        }
        unique.entry(rule.property.as_str()).or_insert(rule);
    }

    let mut predicate: Option<Predicate<E>> = None;
    let mut deferred: IndexMap<String, CollectionPrune> = IndexMap::new();

    for rule in unique.values() {
        let Some(resolved) = path::resolve(E::shape(), &rule.property) else {
            trace!(property = %rule.property, "unknown filter property, ignoring");
            continue;
        };
        check_crossings(&rule.property, &resolved)?;

        let clause = if resolved.collection_crossings == 0 {
            scalar_clause::<E>(rule, resolved.kind, date_format)
        } else {
            exists_clause::<E>(rule, resolved.kind, date_format)
        };
        if let Some(clause) = clause {
            predicate = Some(match (predicate, rule.conjunction) {
                (None, _) => clause,
                (Some(acc), Conjunction::And) => acc.and(clause),
                (Some(acc), Conjunction::Or) => acc.or(clause),
            });
        }

        if !settings.search_all_fields
            && let Some(prune) = prune_clause::<E>(rule, date_format)
        {
            match deferred.get_mut(&prune.collection) {
                Some(existing) => {
                    let left = Arc::clone(&existing.keep);
                    let right = prune.keep;
                    existing.keep = match rule.conjunction {
                        Conjunction::And => {
                            Arc::new(move |element| left(element) && right(element))
                        }
                        Conjunction::Or => Arc::new(move |element| left(element) || right(element)),
                    };
                }
                None => {
                    deferred.insert(prune.collection.clone(), prune);
                }
            }
        }
    }

    Ok(FilterPlan {
        predicate,
        deferred: deferred.into_values().collect(),
    })
}

/// A clause over a scalar (or nested-object scalar) field of the entity.
fn scalar_clause<E: Entity>(
    rule: &FilterRule,
    kind: ValueKind,
    date_format: &str,
) -> Option<Predicate<E>> {
    let test = value_test(kind, &rule.value, rule.exact_match, date_format)?;
    let property = rule.property.clone();
    Some(Predicate::new(move |entity: &E| {
        entity
            .field_value(&property)
            .is_some_and(|value| test(&value))
    }))
}

/// An EXISTS clause over a first-level collection: the entity matches when
/// any element of the collection matches on the remaining path.
fn exists_clause<E: Entity>(
    rule: &FilterRule,
    kind: ValueKind,
    date_format: &str,
) -> Option<Predicate<E>> {
    let test = value_test(kind, &rule.value, rule.exact_match, date_format)?;
    let (collection, remainder) = rule.property.split_once('.')?;
    let collection = collection.to_string();
    let remainder = remainder.to_string();
    Some(Predicate::new(move |entity: &E| {
        entity
            .collection_items(&collection)
            .is_some_and(|elements| {
                elements.iter().any(|element| {
                    element
                        .field_value(&remainder)
                        .is_some_and(|value| test(&value))
                })
            })
    }))
}

/// The deferred pruning pass for one rule, built from its
/// `post_filter_path`. Pipe-separated alternate paths are unioned: an
/// element survives when it matches on any of them.
fn prune_clause<E: Entity>(rule: &FilterRule, date_format: &str) -> Option<CollectionPrune> {
    let paths = rule.post_filter_path.as_deref()?;
    let first = paths.split('|').next()?;
    let (collection, _) = first.split_once('.')?;
    let element_shape = path::collection_element_shape(E::shape(), collection)?;

    let mut alternatives: Vec<(String, ValueTest)> = Vec::new();
    for alternate in paths.split('|') {
        let Some((head, remainder)) = alternate.split_once('.') else {
            continue;
        };
        if head != collection {
            trace!(
                path = alternate,
                "post-filter alternate targets a different collection, ignoring"
            );
            continue;
        }
        let Some(resolved) = path::resolve(element_shape, remainder) else {
            trace!(path = alternate, "unknown post-filter path, ignoring");
            continue;
        };
        let Some(test) = value_test(resolved.kind, &rule.value, rule.exact_match, date_format)
        else {
            continue;
        };
        alternatives.push((remainder.to_string(), test));
    }
    if alternatives.is_empty() {
        return None;
    }

    Some(CollectionPrune {
        collection: collection.to_string(),
        keep: Arc::new(move |element| {
            alternatives.iter().any(|(remainder, test)| {
                element
                    .field_value(remainder)
                    .is_some_and(|value| test(&value))
            })
        }),
    })
}
