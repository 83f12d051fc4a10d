//! Entity traits and the field descriptor table
//!
//! Instead of walking entity values reflectively at query time, every entity
//! type publishes a static *shape*: a table of [`FieldDescriptor`] entries
//! mapping field names to their kind (scalar, nested object, or collection).
//! The filter and sort compilers validate dotted property paths against this
//! table once, before touching the store.

use crate::core::field::FieldValue;
use std::cmp::Ordering;

/// The scalar type of a leaf field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
    DateTime,
}

/// Supplier of a nested or element shape.
///
/// A function pointer keeps descriptor tables `const`-constructible even when
/// shapes reference each other.
pub type ShapeFn = fn() -> &'static [FieldDescriptor];

/// The kind of a declared field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// A scalar leaf. `String` values are scalars, not collections.
    Scalar(ValueKind),
    /// A nested single-valued object; traversal does not count as a
    /// collection crossing.
    Nested(ShapeFn),
    /// A collection of elements described by the given shape.
    Collection(ShapeFn),
}

/// One declared field of an entity shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn scalar(name: &'static str, kind: ValueKind) -> Self {
        FieldDescriptor {
            name,
            kind: FieldKind::Scalar(kind),
        }
    }

    pub const fn nested(name: &'static str, shape: ShapeFn) -> Self {
        FieldDescriptor {
            name,
            kind: FieldKind::Nested(shape),
        }
    }

    pub const fn collection(name: &'static str, shape: ShapeFn) -> Self {
        FieldDescriptor {
            name,
            kind: FieldKind::Collection(shape),
        }
    }
}

/// Object-safe field access, implemented by entities and their collection
/// elements alike.
pub trait FieldAccess: Send + Sync {
    /// Resolve a field value by name.
    ///
    /// Dotted paths address scalar sub-objects (`"meta.note"`); implementors
    /// delegate to the nested value. Unknown names return `None`.
    fn field_value(&self, path: &str) -> Option<FieldValue>;
}

/// A queryable entity.
///
/// Beyond field access, an entity exposes its declared shape and gives the
/// engine dynamic access to its nested collections, which the post-fetch
/// passes prune and reorder in place.
pub trait Entity: FieldAccess + Clone + Send + Sync + 'static {
    /// The static field descriptor table for this entity type.
    fn shape() -> &'static [FieldDescriptor];

    /// Borrow the elements of a nested collection, if the field exists.
    fn collection_items(&self, field: &str) -> Option<Vec<&dyn FieldAccess>>;

    /// Destructively keep only the matching elements of a nested collection.
    fn retain_in_collection(&mut self, field: &str, keep: &mut dyn FnMut(&dyn FieldAccess) -> bool);

    /// Reorder the elements of a nested collection in place.
    fn sort_collection(
        &mut self,
        field: &str,
        cmp: &mut dyn FnMut(&dyn FieldAccess, &dyn FieldAccess) -> Ordering,
    );
}

/// Short type name used in error context (strips the module path).
pub(crate) fn entity_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    full.rsplit("::").next().unwrap_or(full)
}
