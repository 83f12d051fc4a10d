//! Sort combinators and the sort compiler
//!
//! A [`SortOrder`] composes any number of keyed comparisons over an entity.
//! [`compile_sorts`] turns declarative [`SortRule`]s into a [`SortPlan`]:
//! a store-side ordering plus deferred passes that reorder nested
//! collections after fetch. Requests with no usable store-side sort fall
//! back to the first declared scalar field, descending, so paging stays
//! deterministic.

use crate::core::entity::{Entity, FieldAccess, FieldKind};
use crate::core::error::{RepoError, RepoResult};
use crate::core::field::FieldValue;
use crate::core::filter::{PageRequest, SortDirection, SortRule};
use crate::core::path;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::trace;

/// One keyed comparison in a composed ordering.
pub struct SortKey<E> {
    extract: Arc<dyn Fn(&E) -> Option<FieldValue> + Send + Sync>,
    direction: SortDirection,
}

impl<E> Clone for SortKey<E> {
    fn clone(&self) -> Self {
        SortKey {
            extract: Arc::clone(&self.extract),
            direction: self.direction,
        }
    }
}

/// A composed, cloneable ordering over entities.
pub struct SortOrder<E> {
    keys: Vec<SortKey<E>>,
}

impl<E> Clone for SortOrder<E> {
    fn clone(&self) -> Self {
        SortOrder {
            keys: self.keys.clone(),
        }
    }
}

impl<E> Default for SortOrder<E> {
    fn default() -> Self {
        SortOrder { keys: Vec::new() }
    }
}

impl<E> SortOrder<E> {
    /// Start an ordering from one extracted key.
    pub fn by(
        extract: impl Fn(&E) -> Option<FieldValue> + Send + Sync + 'static,
        direction: SortDirection,
    ) -> Self {
        SortOrder {
            keys: vec![SortKey {
                extract: Arc::new(extract),
                direction,
            }],
        }
    }

    /// Append a tie-breaking key.
    pub fn then_by(
        mut self,
        extract: impl Fn(&E) -> Option<FieldValue> + Send + Sync + 'static,
        direction: SortDirection,
    ) -> Self {
        self.keys.push(SortKey {
            extract: Arc::new(extract),
            direction,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compare two entities key by key, first non-equal key wins.
    pub fn compare(&self, left: &E, right: &E) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values((key.extract)(left), (key.extract)(right));
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl<E> std::fmt::Debug for SortOrder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortOrder")
            .field("keys", &self.keys.len())
            .finish()
    }
}

/// Missing values sort before present ones.
fn compare_values(left: Option<FieldValue>, right: Option<FieldValue>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.compare(&right),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A deferred reordering of one nested collection of each fetched entity.
pub struct CollectionSort {
    /// Name of the collection field on the entity.
    pub collection: String,
    /// Element comparator.
    pub compare: Arc<dyn Fn(&dyn FieldAccess, &dyn FieldAccess) -> Ordering + Send + Sync>,
}

impl std::fmt::Debug for CollectionSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionSort")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

/// The compiled form of a request's sorts.
#[derive(Debug)]
pub struct SortPlan<E> {
    /// Store-side ordering, never empty after compilation.
    pub order: SortOrder<E>,
    /// Post-fetch collection reorderings.
    pub deferred: Vec<CollectionSort>,
}

/// Compile the request's sorts into a [`SortPlan`].
///
/// Rules without a `post_sort_path` become store-side keys, deduplicated by
/// property with the first occurrence winning. Unknown properties are
/// ignored; a store-side rule whose path crosses a collection is a
/// configuration error. When no usable store-side key remains, the first
/// declared scalar field is used descending.
pub fn compile_sorts<E: Entity>(settings: &PageRequest) -> RepoResult<SortPlan<E>> {
    let mut unique: IndexMap<&str, &SortRule> = IndexMap::new();
    for rule in &settings.sorts {
        if rule.property.is_empty() || rule.post_sort_path.is_some() {
            continue;
        }
        unique.entry(rule.property.as_str()).or_insert(rule);
    }

    let mut order = SortOrder::default();
    for rule in unique.values() {
        let Some(resolved) = path::resolve(E::shape(), &rule.property) else {
            trace!(property = %rule.property, "unknown sort property, ignoring");
            continue;
        };
        if resolved.collection_crossings > 0 {
            return Err(RepoError::configuration(format!(
                "sort path '{}' reaches into a collection; use a post sort path instead",
                rule.property
            )));
        }
        let property = rule.property.clone();
        order = order.then_by(move |entity: &E| entity.field_value(&property), rule.direction);
    }

    if order.is_empty() {
        order = fallback_order::<E>()?;
    }

    let mut deferred = Vec::new();
    for rule in &settings.sorts {
        if let Some(sort) = collection_sort::<E>(rule) {
            deferred.push(sort);
        }
    }

    Ok(SortPlan { order, deferred })
}

/// Default ordering when the request carries no usable sort: the first
/// declared scalar field, descending.
fn fallback_order<E: Entity>() -> RepoResult<SortOrder<E>> {
    let descriptor = E::shape()
        .iter()
        .find(|descriptor| matches!(descriptor.kind, FieldKind::Scalar(_)))
        .ok_or_else(|| {
            RepoError::configuration(format!(
                "no scalar field available on {} for the default sort",
                crate::core::entity::entity_name::<E>()
            ))
        })?;
    let name = descriptor.name;
    Ok(SortOrder::by(
        move |entity: &E| entity.field_value(name),
        SortDirection::Desc,
    ))
}

/// The deferred reorder pass for one rule, built from its `post_sort_path`.
fn collection_sort<E: Entity>(rule: &SortRule) -> Option<CollectionSort> {
    let sort_path = rule.post_sort_path.as_deref()?;
    let (collection, remainder) = sort_path.split_once('.')?;
    let element_shape = path::collection_element_shape(E::shape(), collection)?;
    if path::resolve(element_shape, remainder).is_none() {
        trace!(path = sort_path, "unknown post-sort path, ignoring");
        return None;
    }

    let remainder = remainder.to_string();
    let direction = rule.direction;
    Some(CollectionSort {
        collection: collection.to_string(),
        compare: Arc::new(move |left, right| {
            let ordering =
                compare_values(left.field_value(&remainder), right.field_value(&remainder));
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixture::{MockModel, fixture};

    fn sorted(plan: &SortPlan<MockModel>) -> Vec<MockModel> {
        let mut items = fixture();
        items.sort_by(|a, b| plan.order.compare(a, b));
        items
    }

    #[test]
    fn test_ascending_label_sort() {
        let settings = PageRequest {
            sorts: vec![SortRule::asc("label")],
            ..Default::default()
        };
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        let items = sorted(&plan);
        assert_eq!(items.first().unwrap().label, "Eigth Label");
        // Alphabetically "Nineth" lands mid-list and "Third Label" last.
        assert_eq!(items[4].label, "Nineth");
        assert_eq!(items.last().unwrap().label, "Third Label");
    }

    #[test]
    fn test_descending_sort_reverses() {
        let settings = PageRequest {
            sorts: vec![SortRule::desc("id")],
            ..Default::default()
        };
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        let items = sorted(&plan);
        assert_eq!(items.first().unwrap().id, 9);
        assert_eq!(items.last().unwrap().id, 1);
    }

    #[test]
    fn test_no_sort_falls_back_to_first_scalar_descending() {
        let settings = PageRequest::default();
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        assert!(!plan.order.is_empty());
        let items = sorted(&plan);
        assert_eq!(items.first().unwrap().id, 9);
    }

    #[test]
    fn test_unknown_sort_property_falls_back() {
        let settings = PageRequest {
            sorts: vec![SortRule::asc("no_such_field")],
            ..Default::default()
        };
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        let items = sorted(&plan);
        assert_eq!(items.first().unwrap().id, 9);
    }

    #[test]
    fn test_duplicate_sort_properties_first_wins() {
        let settings = PageRequest {
            sorts: vec![SortRule::asc("id"), SortRule::desc("id")],
            ..Default::default()
        };
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        let items = sorted(&plan);
        assert_eq!(items.first().unwrap().id, 1);
    }

    #[test]
    fn test_collection_sort_without_post_path_is_error() {
        let settings = PageRequest {
            sorts: vec![SortRule::asc("children.label")],
            ..Default::default()
        };
        let err = compile_sorts::<MockModel>(&settings).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_post_sort_builds_deferred_pass() {
        let settings = PageRequest {
            sorts: vec![SortRule::desc("children.label").post_sort("children.label")],
            ..Default::default()
        };
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        assert_eq!(plan.deferred.len(), 1);
        assert_eq!(plan.deferred[0].collection, "children");

        let mut entity = fixture().remove(0);
        let compare = Arc::clone(&plan.deferred[0].compare);
        entity.sort_collection("children", &mut |a, b| compare(a, b));
        let labels: Vec<&str> = entity
            .children
            .iter()
            .map(|child| child.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Child Two", "Child Three", "Child One"]);
    }

    #[test]
    fn test_missing_values_sort_first_ascending() {
        let settings = PageRequest {
            sorts: vec![SortRule::asc("description")],
            ..Default::default()
        };
        let plan = compile_sorts::<MockModel>(&settings).unwrap();
        let items = sorted(&plan);
        // The ninth row has no description and leads the ascending order.
        assert_eq!(items.first().unwrap().id, 9);
    }
}
