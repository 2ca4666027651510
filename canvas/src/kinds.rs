//! Kind registry: rebuild primitives from property bags by kind tag.
//!
//! Undo of a removal, redo of a creation, and inbound remote creates all start
//! from a property bag and must produce a primitive the surface can place. The
//! registry maps the bag's `"type"` tag to a reconstruction function, so new
//! kinds (or aliases used by other clients) are added by registering another
//! entry rather than by touching the engine.

#[cfg(test)]
#[path = "kinds_test.rs"]
mod kinds_test;

use std::collections::HashMap;

use serde_json::Value;

use crate::consts::KIND_KEY;
use crate::doc::{Primitive, PrimitiveKind, PropertyBag};

/// Error returned by [`KindRegistry::reconstruct`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KindError {
    /// The bag has no string `"type"` entry.
    #[error("property bag has no kind tag")]
    MissingTag,
    /// No reconstructor is registered for the tag.
    #[error("unknown primitive kind: {0}")]
    Unknown(String),
    /// A custom reconstructor refused the bag.
    #[error("cannot rebuild {kind}: {reason}")]
    Rejected { kind: &'static str, reason: String },
}

/// Builds a [`Primitive`] of a known kind from a property bag.
pub type Reconstructor = fn(PrimitiveKind, &PropertyBag) -> Result<Primitive, KindError>;

#[derive(Clone, Copy)]
struct Entry {
    kind: PrimitiveKind,
    reconstruct: Reconstructor,
}

/// Tag-to-reconstructor table.
///
/// The kind is decided by the tag alone. Geometry is never required: a bag
/// with nothing but a tag still rebuilds, and the surface draws it with
/// its defaults.
#[derive(Clone)]
pub struct KindRegistry {
    entries: HashMap<String, Entry>,
}

impl KindRegistry {
    /// An empty registry. Nothing can be reconstructed until kinds are registered.
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Registry with every built-in kind and the common aliases.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut kinds = Self::empty();
        for kind in [
            PrimitiveKind::Circle,
            PrimitiveKind::Rect,
            PrimitiveKind::Triangle,
            PrimitiveKind::Path,
            PrimitiveKind::Text,
        ] {
            kinds.register(kind.tag(), kind);
        }
        kinds.register("rectangle", PrimitiveKind::Rect);
        kinds.register("line", PrimitiveKind::Path);
        kinds.register("text", PrimitiveKind::Text);
        kinds
    }

    /// Map `tag` to `kind`, copying the bag as-is under the canonical tag.
    pub fn register(&mut self, tag: impl Into<String>, kind: PrimitiveKind) {
        self.register_with(tag, kind, copy_props);
    }

    /// Map `tag` to `kind` with a custom reconstructor.
    pub fn register_with(&mut self, tag: impl Into<String>, kind: PrimitiveKind, reconstruct: Reconstructor) {
        self.entries.insert(tag.into(), Entry { kind, reconstruct });
    }

    /// Whether `tag` has a reconstructor.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Rebuild a primitive from a property bag.
    ///
    /// # Errors
    ///
    /// Returns [`KindError::MissingTag`] when the bag has no tag,
    /// [`KindError::Unknown`] for unregistered tags, and whatever a custom
    /// reconstructor rejects.
    pub fn reconstruct(&self, bag: &PropertyBag) -> Result<Primitive, KindError> {
        let entry = self.entry(bag)?;
        (entry.reconstruct)(entry.kind, bag)
    }

    /// Resolve the kind named by a bag's tag without building the primitive.
    ///
    /// # Errors
    ///
    /// [`KindError::MissingTag`] or [`KindError::Unknown`].
    pub fn kind_of(&self, bag: &PropertyBag) -> Result<PrimitiveKind, KindError> {
        self.entry(bag).map(|entry| entry.kind)
    }

    fn entry(&self, bag: &PropertyBag) -> Result<Entry, KindError> {
        let tag = bag.get(KIND_KEY).and_then(Value::as_str).ok_or(KindError::MissingTag)?;
        self.entries
            .get(tag)
            .copied()
            .ok_or_else(|| KindError::Unknown(tag.to_owned()))
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The default reconstructor: the bag's properties under the canonical tag.
#[allow(clippy::unnecessary_wraps)]
fn copy_props(kind: PrimitiveKind, bag: &PropertyBag) -> Result<Primitive, KindError> {
    let mut props = bag.clone();
    props.insert(KIND_KEY.to_owned(), Value::String(kind.tag().to_owned()));
    Ok(Primitive { kind, props })
}
