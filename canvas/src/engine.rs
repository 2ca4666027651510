use serde_json::{Value, json};
use tracing::{debug, error, warn};

use frames::{Action, CodecError, WireMessage};

use crate::consts::{
    ARROW_PATH, CIRCLE_RADIUS, DEFAULT_TEXT, ERASER_COLOR, ERASER_COMPOSITE, LINE_PATH, SHAPE_SIZE,
    TEXT_FONT_SIZE,
};
use crate::doc::{Point, PrimitiveKind, PropertyBag, Props, merge_patch};
use crate::history::{ChangeKind, ChangeRecord, History, SurfaceOp};
use crate::identity::{Identity, IdentityRegistry};
use crate::input::{Command, Key, Modifiers, Shape, Tool, UiState, command_for};
use crate::kinds::{KindError, KindRegistry};
use crate::surface::Surface;
use crate::sync::{self, Broadcaster};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// The drawing-board engine the UI holds.
///
/// Owns the identity registry, the kind registry, and the history, and drives
/// a rendering surface through the [`Surface`] trait. Every method takes
/// `&mut self`, so local edits, undo, redo, and inbound remote edits are
/// applied one at a time in call order.
pub struct EngineCore<S: Surface, B: Broadcaster> {
    pub surface: S,
    pub ui: UiState,
    registry: IdentityRegistry<S::Ref>,
    kinds: KindRegistry,
    history: History,
    broadcaster: B,
}

impl<S: Surface, B: Broadcaster> EngineCore<S, B> {
    /// Engine with the built-in kinds and a randomly tagged identity allocator.
    pub fn new(surface: S, broadcaster: B) -> Self {
        Self::with_parts(surface, broadcaster, IdentityRegistry::new(), KindRegistry::with_defaults())
    }

    pub fn with_parts(surface: S, broadcaster: B, registry: IdentityRegistry<S::Ref>, kinds: KindRegistry) -> Self {
        Self { surface, ui: UiState::default(), registry, kinds, history: History::new(), broadcaster }
    }

    // --- Identity ---

    /// Give a primitive the host created directly on the surface its identity.
    pub fn register(&mut self, primitive: S::Ref) -> Identity {
        self.registry.assign(primitive)
    }

    /// Place a primitive described by `bag` on the surface and identify it.
    ///
    /// Nothing is recorded; follow with [`EngineCore::record_change`] to make
    /// it undoable.
    ///
    /// # Errors
    ///
    /// Returns the kind registry's error when the bag cannot be rebuilt.
    pub fn adopt(&mut self, bag: &PropertyBag) -> Result<Identity, KindError> {
        let rebuilt = self.kinds.reconstruct(bag)?;
        let primitive = self.surface.create_primitive(rebuilt.kind, rebuilt.props);
        Ok(self.register(primitive))
    }

    /// Resolve an identity to a live primitive.
    pub fn resolve(&mut self, identity: &Identity) -> Option<S::Ref> {
        self.registry.resolve(identity, &self.surface)
    }

    /// Identities of every live primitive.
    #[must_use]
    pub fn all_identities(&self) -> Vec<Identity> {
        self.registry.all_identities(&self.surface)
    }

    /// Current property bag of a live primitive.
    #[must_use]
    pub fn object(&self, identity: &Identity) -> Option<PropertyBag> {
        let primitive = self.registry.lookup(identity)?;
        self.surface.to_property_bag(primitive)
    }

    /// Every identified primitive with its property bag, in surface order.
    #[must_use]
    pub fn objects(&self) -> Vec<(Identity, PropertyBag)> {
        self.surface
            .list_primitives()
            .into_iter()
            .filter_map(|primitive| {
                let identity = self.registry.identity_of(&primitive)?.clone();
                let bag = self.surface.to_property_bag(&primitive)?;
                Some((identity, bag))
            })
            .collect()
    }

    // --- History ---

    /// Record a local edit that has already been applied to the surface.
    ///
    /// Appends to the log, clears the redo buffer, and broadcasts the change.
    /// A record whose snapshots do not match its kind is a caller bug: it
    /// asserts in debug builds and is logged and dropped otherwise.
    pub fn record_change(
        &mut self,
        kind: ChangeKind,
        identity: Identity,
        prior: Option<PropertyBag>,
        posterior: Option<PropertyBag>,
    ) {
        let record = ChangeRecord::new(kind, identity, prior, posterior);
        debug_assert!(record.is_ok(), "malformed change record: {record:?}");
        match record {
            Ok(record) => self.commit(record),
            Err(e) => error!(error = %e, "history: malformed change record dropped"),
        }
    }

    /// Record an edit the host made on its own copy of the board.
    ///
    /// The surface is first brought in line with the change (the posterior
    /// placed, or the primitive removed), then the change is recorded as by
    /// [`EngineCore::record_change`].
    pub fn record_host_change(
        &mut self,
        kind: ChangeKind,
        identity: Identity,
        prior: Option<PropertyBag>,
        posterior: Option<PropertyBag>,
    ) {
        let op = match kind {
            ChangeKind::Remove => Some(SurfaceOp::Remove),
            ChangeKind::Create | ChangeKind::Modify => posterior.clone().map(SurfaceOp::Place),
        };
        if let Some(op) = op {
            self.apply_op(&identity, op);
        }
        self.record_change(kind, identity, prior, posterior);
    }

    /// Reverse the newest local edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.history.undo() else {
            return false;
        };
        let identity = record.identity().clone();
        if let Some(op) = record.inverse() {
            self.apply_op(&identity, op);
        }
        true
    }

    /// Reapply the newest undone edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.history.redo() else {
            return false;
        };
        let identity = record.identity().clone();
        if let Some(op) = record.forward() {
            self.apply_op(&identity, op);
        }
        true
    }

    /// Remove every primitive and empty both history stacks.
    ///
    /// Peers receive a `remove` for each primitive that had an identity.
    pub fn clear_all(&mut self) {
        let mut removed = Vec::new();
        for primitive in self.surface.list_primitives() {
            let identity = self.registry.identity_of(&primitive).cloned();
            let bag = self.surface.to_property_bag(&primitive);
            self.surface.remove_primitive(&primitive);
            if let (Some(identity), Some(bag)) = (identity, bag) {
                removed.push(WireMessage::new(Action::Remove, identity.as_str(), Value::Object(bag)));
            }
        }
        self.registry.clear();
        self.history.clear();
        self.ui.selection.clear();
        for message in &removed {
            self.send(message);
        }
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    // --- Sync ---

    /// Apply an edit received from a peer. History is untouched.
    ///
    /// Returns whether the surface changed; stale identities are skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for structurally invalid messages.
    pub fn apply_remote(&mut self, message: &WireMessage) -> Result<bool, CodecError> {
        let (identity, op) = sync::inbound_op(message)?;
        Ok(self.apply_op(&identity, op))
    }

    /// Decode a JSON wire message and apply it as a remote edit.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] for malformed or invalid messages.
    pub fn apply_remote_json(&mut self, text: &str) -> Result<bool, CodecError> {
        let message = frames::decode_json(text)?;
        self.apply_remote(&message)
    }

    #[must_use]
    pub fn broadcaster(&self) -> &B {
        &self.broadcaster
    }

    pub fn broadcaster_mut(&mut self) -> &mut B {
        &mut self.broadcaster
    }

    // --- Local edits ---

    /// Create a primitive locally and record it.
    pub fn create(&mut self, kind: PrimitiveKind, props: PropertyBag) -> Identity {
        let primitive = self.surface.create_primitive(kind, props);
        let identity = self.registry.assign(primitive.clone());
        match self.surface.to_property_bag(&primitive) {
            Some(posterior) => self.commit(ChangeRecord::create(identity.clone(), posterior)),
            None => warn!(%identity, "history: created primitive has no property bag"),
        }
        identity
    }

    /// Remove a primitive locally and record it. Returns `false` if it is not live.
    pub fn remove(&mut self, identity: &Identity) -> bool {
        let Some(primitive) = self.resolve(identity) else {
            return false;
        };
        let Some(prior) = self.surface.to_property_bag(&primitive) else {
            return false;
        };
        self.surface.remove_primitive(&primitive);
        self.registry.release(identity);
        self.ui.deselect(identity);
        self.commit(ChangeRecord::remove(identity.clone(), prior));
        true
    }

    /// Merge `patch` into a primitive's properties and record it.
    ///
    /// `null` values delete keys. Returns `false` if the primitive is not live
    /// or the patch changes nothing.
    pub fn modify(&mut self, identity: &Identity, patch: &PropertyBag) -> bool {
        let Some(primitive) = self.resolve(identity) else {
            return false;
        };
        let Some(prior) = self.surface.to_property_bag(&primitive) else {
            return false;
        };
        let mut posterior = prior.clone();
        merge_patch(&mut posterior, patch);
        if posterior == prior {
            return false;
        }
        self.surface.set_properties(&primitive, posterior.clone());
        // The surface may drop parts of the patch (the kind tag is fixed at creation).
        let posterior = self.surface.to_property_bag(&primitive).unwrap_or(posterior);
        if posterior == prior {
            return false;
        }
        self.commit(ChangeRecord::modify(identity.clone(), prior, posterior));
        true
    }

    // --- Toolbar ---

    /// Add a closed shape at `center` in the current color and select it.
    pub fn add_shape(&mut self, shape: Shape, center: Point) -> Identity {
        let color = self.ui.settings.color.clone();
        let (kind, props) = match shape {
            Shape::Circle => (
                PrimitiveKind::Circle,
                json!({ "radius": CIRCLE_RADIUS, "fill": color, "left": center.x, "top": center.y }),
            ),
            Shape::Rectangle => (
                PrimitiveKind::Rect,
                json!({ "width": SHAPE_SIZE, "height": SHAPE_SIZE, "fill": color, "left": center.x, "top": center.y }),
            ),
            Shape::Triangle => (
                PrimitiveKind::Triangle,
                json!({ "width": SHAPE_SIZE, "height": SHAPE_SIZE, "fill": color, "left": center.x, "top": center.y }),
            ),
        };
        self.add_and_select(kind, props)
    }

    /// Add a line (or arrow) at `center` with the pencil width and select it.
    pub fn add_line(&mut self, arrow: bool, center: Point) -> Identity {
        let color = self.ui.settings.color.clone();
        let props = json!({
            "path": if arrow { ARROW_PATH } else { LINE_PATH },
            "fill": color,
            "stroke": color,
            "strokeWidth": self.ui.settings.pencil_size,
            "left": center.x,
            "top": center.y,
        });
        self.add_and_select(PrimitiveKind::Path, props)
    }

    /// Add placeholder text at `center` and select it.
    pub fn add_text(&mut self, center: Point) -> Identity {
        let props = json!({
            "text": DEFAULT_TEXT,
            "fill": self.ui.settings.color,
            "fontSize": TEXT_FONT_SIZE,
            "left": center.x,
            "top": center.y,
        });
        self.add_and_select(PrimitiveKind::Text, props)
    }

    /// Record a finished freehand stroke drawn with the pencil or eraser.
    pub fn commit_stroke(&mut self, path: Value) -> Identity {
        let settings = &self.ui.settings;
        let props = if self.ui.tool == Tool::Eraser {
            json!({
                "path": path,
                "stroke": ERASER_COLOR,
                "strokeWidth": settings.eraser_size,
                "globalCompositeOperation": ERASER_COMPOSITE,
            })
        } else {
            json!({
                "path": path,
                "stroke": settings.color,
                "strokeWidth": settings.pencil_size,
            })
        };
        self.create(PrimitiveKind::Path, into_bag(props))
    }

    /// Set the drawing color and recolor the active primitive, if any.
    ///
    /// Returns whether a primitive was recolored.
    pub fn set_color(&mut self, color: &str) -> bool {
        self.ui.settings.color = color.to_owned();
        let Some(active) = self.ui.active().cloned() else {
            return false;
        };
        self.modify(&active, &into_bag(json!({ "fill": color })))
    }

    /// Select a single live primitive.
    pub fn select(&mut self, identity: &Identity) -> bool {
        if self.resolve(identity).is_none() {
            return false;
        }
        self.ui.selection = vec![identity.clone()];
        true
    }

    /// Remove every selected primitive, unless the active one is text being typed into.
    ///
    /// Returns the number of primitives removed.
    pub fn delete_selection(&mut self) -> usize {
        if let Some(active) = self.ui.active() {
            if let Some(bag) = self.object(active) {
                if Props::new(&bag).kind_tag() == PrimitiveKind::Text.tag() {
                    return 0;
                }
            }
        }
        let selection = std::mem::take(&mut self.ui.selection);
        selection.iter().filter(|id| self.remove(id)).count()
    }

    // --- Input ---

    /// Handle a key press. Returns whether anything changed.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> bool {
        match command_for(key, modifiers) {
            Some(Command::Undo) => self.undo(),
            Some(Command::Redo) => self.redo(),
            Some(Command::DeleteSelection) => self.delete_selection() > 0,
            None => false,
        }
    }

    /// Switch tools.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
    }

    // --- Internals ---

    fn add_and_select(&mut self, kind: PrimitiveKind, props: Value) -> Identity {
        let identity = self.create(kind, into_bag(props));
        self.ui.selection = vec![identity.clone()];
        self.ui.tool = Tool::Cursor;
        identity
    }

    fn commit(&mut self, record: ChangeRecord) {
        let message = sync::outbound_message(&record, &self.kinds);
        self.history.push(record);
        self.send(&message);
    }

    fn send(&mut self, message: &WireMessage) {
        if let Err(e) = self.broadcaster.broadcast(message) {
            warn!(error = %e, identity = %message.identity, action = message.action.as_str(), "sync: broadcast failed");
        }
    }

    /// Apply an operation to the primitive at `identity` without recording it.
    ///
    /// A bag whose tag names a different kind than the live primitive replaces
    /// it with a rebuilt one under the same identity.
    fn apply_op(&mut self, identity: &Identity, op: SurfaceOp) -> bool {
        let live = self.registry.resolve(identity, &self.surface);
        match (op, live) {
            (SurfaceOp::Remove, Some(primitive)) => {
                self.surface.remove_primitive(&primitive);
                self.registry.release(identity);
                self.ui.deselect(identity);
                true
            }
            (SurfaceOp::Overwrite(bag) | SurfaceOp::Place(bag), Some(primitive)) => {
                if self.changes_kind(&primitive, &bag) {
                    self.rebuild(identity, &bag, Some(&primitive))
                } else {
                    self.surface.set_properties(&primitive, bag)
                }
            }
            (SurfaceOp::Place(bag), None) => self.rebuild(identity, &bag, None),
            (SurfaceOp::Remove | SurfaceOp::Overwrite(_), None) => {
                debug!(%identity, "history: identity no longer live, skipped");
                false
            }
        }
    }

    fn changes_kind(&self, primitive: &S::Ref, bag: &PropertyBag) -> bool {
        let Ok(kind) = self.kinds.kind_of(bag) else {
            return false;
        };
        self.surface
            .to_property_bag(primitive)
            .is_some_and(|current| Props::new(&current).kind_tag() != kind.tag())
    }

    /// Build a primitive from `bag` through the kind registry and bind it to
    /// `identity`, dropping `replaced` once the new one exists.
    fn rebuild(&mut self, identity: &Identity, bag: &PropertyBag, replaced: Option<&S::Ref>) -> bool {
        let rebuilt = match self.kinds.reconstruct(bag) {
            Ok(rebuilt) => rebuilt,
            Err(e) => {
                warn!(%identity, error = %e, "history: cannot rebuild primitive, skipped");
                return false;
            }
        };
        if let Some(old) = replaced {
            self.surface.remove_primitive(old);
        }
        let primitive = self.surface.create_primitive(rebuilt.kind, rebuilt.props);
        self.registry.restore(identity.clone(), primitive);
        true
    }
}

fn into_bag(value: Value) -> PropertyBag {
    match value {
        Value::Object(bag) => bag,
        _ => PropertyBag::new(),
    }
}
