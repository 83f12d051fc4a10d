//! Dotted property path resolution against an entity shape

use crate::core::entity::{FieldDescriptor, FieldKind, ValueKind};

/// Outcome of resolving a dotted property path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Scalar kind of the leaf field.
    pub kind: ValueKind,
    /// How many collection boundaries the path traverses.
    pub collection_crossings: usize,
    /// Segment index at which the first collection boundary was crossed.
    pub crossed_at: Option<usize>,
}

/// Resolve `path` against a field descriptor table.
///
/// Walks segment by segment: scalar fields terminate the path, nested fields
/// are traversed transparently, and collection fields continue into the
/// element shape while counting the crossing. Returns `None` for unknown
/// segments or paths that do not end on a scalar — callers treat that as
/// "ignore this filter/sort entry", never as an error.
pub fn resolve(shape: &'static [FieldDescriptor], path: &str) -> Option<ResolvedPath> {
    if path.is_empty() {
        return None;
    }

    let segments: Vec<&str> = path.split('.').collect();
    let mut current = shape;
    let mut crossings = 0;
    let mut crossed_at = None;

    for (index, segment) in segments.iter().enumerate() {
        let field = lookup(current, segment)?;
        let is_last = index + 1 == segments.len();

        match field.kind {
            FieldKind::Scalar(kind) => {
                if !is_last {
                    // Path keeps going past a leaf.
                    return None;
                }
                return Some(ResolvedPath {
                    kind,
                    collection_crossings: crossings,
                    crossed_at,
                });
            }
            FieldKind::Nested(inner) => {
                if is_last {
                    // The path names an object, not a filterable scalar.
                    return None;
                }
                current = inner();
            }
            FieldKind::Collection(element) => {
                if is_last {
                    // The path names the collection holder itself.
                    return None;
                }
                crossings += 1;
                if crossed_at.is_none() {
                    crossed_at = Some(index);
                }
                current = element();
            }
        }
    }

    None
}

/// Look up a field by name in a descriptor table.
pub fn lookup<'a>(shape: &'a [FieldDescriptor], name: &str) -> Option<&'a FieldDescriptor> {
    shape.iter().find(|descriptor| descriptor.name == name)
}

/// Find the element shape of a named collection field, if it exists.
pub(crate) fn collection_element_shape(
    shape: &'static [FieldDescriptor],
    name: &str,
) -> Option<&'static [FieldDescriptor]> {
    match lookup(shape, name)?.kind {
        FieldKind::Collection(element) => Some(element()),
        _ => None,
    }
}
