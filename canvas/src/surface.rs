//! Rendering-surface contract consumed by the engine.
//!
//! The surface owns pixels, geometry, and its own primitive references. The
//! engine never looks inside a primitive; it only moves property bags in and
//! out through this trait. References may be invalidated when a primitive is
//! removed, which is why history records name primitives by [`Identity`]
//! rather than by `Ref`.
//!
//! [`Identity`]: crate::identity::Identity

use std::fmt::Debug;
use std::hash::Hash;

use crate::doc::{PrimitiveKind, PropertyBag};

/// Operations the engine needs from a rendering surface.
pub trait Surface {
    /// The surface's own handle to a live primitive.
    type Ref: Clone + Eq + Hash + Debug;

    /// Create a primitive of `kind` with `props` and return its handle.
    fn create_primitive(&mut self, kind: PrimitiveKind, props: PropertyBag) -> Self::Ref;

    /// Remove a primitive. Returns `false` if it was not on the surface.
    fn remove_primitive(&mut self, primitive: &Self::Ref) -> bool;

    /// Replace a primitive's properties. Returns `false` if it was not on the surface.
    fn set_properties(&mut self, primitive: &Self::Ref, props: PropertyBag) -> bool;

    /// Serialize a primitive, including its kind tag under `"type"`.
    fn to_property_bag(&self, primitive: &Self::Ref) -> Option<PropertyBag>;

    /// Handles of every live primitive.
    fn list_primitives(&self) -> Vec<Self::Ref>;

    /// Whether `primitive` is still live.
    fn contains(&self, primitive: &Self::Ref) -> bool {
        self.list_primitives().contains(primitive)
    }
}
