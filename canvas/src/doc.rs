//! Document model: primitive kinds, property bags, and the in-memory surface.
//!
//! This module defines what a drawing primitive looks like to the core
//! (`PrimitiveKind`, `Primitive`), the open-ended property bag the rendering
//! surface owns (`PropertyBag`) with a typed accessor (`Props`), and
//! `MemorySurface`, a headless implementation of the [`Surface`] contract.
//!
//! Property bags flow in from the surface (`to_property_bag`), are captured in
//! change records, travel on the wire as snapshots, and flow back into the
//! surface on undo, redo, and inbound remote edits.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::KIND_KEY;
use crate::surface::Surface;

/// Surface-defined serialization of a primitive's visual attributes.
pub type PropertyBag = Map<String, Value>;

/// The kind of a drawing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Circle defined by `radius`.
    #[serde(rename = "circle")]
    Circle,
    /// Axis-aligned rectangle defined by `width` and `height`.
    #[serde(rename = "rect")]
    Rect,
    /// Isosceles triangle inscribed in `width` x `height`.
    #[serde(rename = "triangle")]
    Triangle,
    /// SVG-style path: freehand strokes, lines, and arrows.
    #[serde(rename = "path")]
    Path,
    /// Editable text.
    #[serde(rename = "i-text")]
    Text,
}

impl PrimitiveKind {
    /// Canonical tag stored under the `"type"` key of a property bag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Rect => "rect",
            Self::Triangle => "triangle",
            Self::Path => "path",
            Self::Text => "i-text",
        }
    }

    /// Wire action announcing the creation of a primitive of this kind.
    #[must_use]
    pub fn create_action(self) -> frames::Action {
        match self {
            Self::Circle | Self::Rect | Self::Triangle => frames::Action::AddShape,
            Self::Path => frames::Action::AddLine,
            Self::Text => frames::Action::AddText,
        }
    }
}

/// A primitive ready to be placed on a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub props: PropertyBag,
}

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Typed access to common fields of a property bag.
pub struct Props<'a> {
    bag: &'a PropertyBag,
}

impl<'a> Props<'a> {
    /// Wrap a property bag for typed access.
    #[must_use]
    pub fn new(bag: &'a PropertyBag) -> Self {
        Self { bag }
    }

    /// Kind tag under `"type"`. Empty string when absent.
    #[must_use]
    pub fn kind_tag(&self) -> &str {
        self.str_or(KIND_KEY, "")
    }

    /// Fill color as a CSS color string. Empty string when absent.
    #[must_use]
    pub fn fill(&self) -> &str {
        self.str_or("fill", "")
    }

    /// Stroke color as a CSS color string. Empty string when absent.
    #[must_use]
    pub fn stroke(&self) -> &str {
        self.str_or("stroke", "")
    }

    /// Stroke width in pixels. Defaults to `1.0` when absent.
    #[must_use]
    pub fn stroke_width(&self) -> f64 {
        self.bag
            .get("strokeWidth")
            .and_then(Value::as_f64)
            .unwrap_or(1.0)
    }

    /// Text content. Empty string when absent.
    #[must_use]
    pub fn text(&self) -> &str {
        self.str_or("text", "")
    }

    fn str_or(&self, key: &str, default: &'a str) -> &'a str {
        self.bag.get(key).and_then(Value::as_str).unwrap_or(default)
    }
}

/// Merge `patch` into `bag`. Keys mapped to `null` are removed.
pub fn merge_patch(bag: &mut PropertyBag, patch: &PropertyBag) {
    for (k, v) in patch {
        if v.is_null() {
            bag.remove(k);
        } else {
            bag.insert(k.clone(), v.clone());
        }
    }
}

/// Handle to a primitive living on a [`MemorySurface`].
///
/// Handles are never reused: recreating a removed primitive yields a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveRef(u64);

/// In-memory rendering surface.
pub struct MemorySurface {
    primitives: HashMap<PrimitiveRef, Primitive>,
    next_ref: u64,
}

impl MemorySurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self { primitives: HashMap::new(), next_ref: 1 }
    }

    /// Return a reference to a primitive by handle.
    #[must_use]
    pub fn get(&self, primitive: &PrimitiveRef) -> Option<&Primitive> {
        self.primitives.get(primitive)
    }

    /// Return all primitives in creation order, which is also draw order.
    #[must_use]
    pub fn sorted_primitives(&self) -> Vec<(PrimitiveRef, &Primitive)> {
        let mut prims: Vec<(PrimitiveRef, &Primitive)> =
            self.primitives.iter().map(|(r, p)| (*r, p)).collect();
        prims.sort_by_key(|(r, _)| *r);
        prims
    }

    /// Number of primitives currently on the surface.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Returns `true` if the surface holds no primitives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for MemorySurface {
    type Ref = PrimitiveRef;

    fn create_primitive(&mut self, kind: PrimitiveKind, mut props: PropertyBag) -> PrimitiveRef {
        props.remove(KIND_KEY);
        let handle = PrimitiveRef(self.next_ref);
        self.next_ref += 1;
        self.primitives.insert(handle, Primitive { kind, props });
        handle
    }

    fn remove_primitive(&mut self, primitive: &PrimitiveRef) -> bool {
        self.primitives.remove(primitive).is_some()
    }

    fn set_properties(&mut self, primitive: &PrimitiveRef, mut props: PropertyBag) -> bool {
        let Some(existing) = self.primitives.get_mut(primitive) else {
            return false;
        };
        props.remove(KIND_KEY);
        existing.props = props;
        true
    }

    fn to_property_bag(&self, primitive: &PrimitiveRef) -> Option<PropertyBag> {
        let existing = self.primitives.get(primitive)?;
        let mut bag = existing.props.clone();
        bag.insert(KIND_KEY.to_owned(), Value::String(existing.kind.tag().to_owned()));
        Some(bag)
    }

    fn list_primitives(&self) -> Vec<PrimitiveRef> {
        self.sorted_primitives().into_iter().map(|(r, _)| r).collect()
    }

    fn contains(&self, primitive: &PrimitiveRef) -> bool {
        self.primitives.contains_key(primitive)
    }
}
