//! Browser binding: exposes the engine to the JavaScript host.
//!
//! The host keeps rendering with its own vector-graphics library. It reads
//! the primitives to draw from [`Whiteboard::objects_json`], forwards toolbar
//! and keyboard events here, pushes socket messages into
//! [`Whiteboard::apply_remote`], and receives outbound messages through the
//! callback passed to the constructor.

use frames::WireMessage;
use js_sys::Function;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::doc::{MemorySurface, Point, PropertyBag};
use crate::engine::EngineCore;
use crate::history::{ChangeKind, ChangeRecord};
use crate::identity::Identity;
use crate::input::{Key, Modifiers, Shape, Tool};
use crate::sync::{Broadcaster, TransportError};

/// Sends each outbound message to a JS callback as a JSON string.
pub struct JsBroadcaster {
    callback: Function,
}

impl Broadcaster for JsBroadcaster {
    fn broadcast(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        let text = frames::encode_json(message)?;
        self.callback
            .call1(&JsValue::NULL, &JsValue::from_str(&text))
            .map(|_| ())
            .map_err(|e| TransportError::Send(format!("{e:?}")))
    }
}

#[wasm_bindgen]
pub struct Whiteboard {
    core: EngineCore<MemorySurface, JsBroadcaster>,
}

#[wasm_bindgen]
impl Whiteboard {
    /// `on_broadcast` is called with one JSON wire message per local edit.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new(on_broadcast: Function) -> Self {
        Self { core: EngineCore::new(MemorySurface::new(), JsBroadcaster { callback: on_broadcast }) }
    }

    /// Add `circle`, `rectangle`, or `triangle` at the given center.
    ///
    /// # Errors
    ///
    /// Rejects unknown shape names.
    pub fn add_shape(&mut self, shape: &str, x: f64, y: f64) -> Result<String, JsValue> {
        let shape = Shape::from_name(shape).ok_or_else(|| JsValue::from_str(&format!("unknown shape: {shape}")))?;
        Ok(self.core.add_shape(shape, Point::new(x, y)).to_string())
    }

    pub fn add_line(&mut self, arrow: bool, x: f64, y: f64) -> String {
        self.core.add_line(arrow, Point::new(x, y)).to_string()
    }

    pub fn add_text(&mut self, x: f64, y: f64) -> String {
        self.core.add_text(Point::new(x, y)).to_string()
    }

    /// Record a finished freehand stroke. `path_json` is the path command list.
    ///
    /// # Errors
    ///
    /// Rejects malformed JSON.
    pub fn commit_stroke(&mut self, path_json: &str) -> Result<String, JsValue> {
        let path: Value = serde_json::from_str(path_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.core.commit_stroke(path).to_string())
    }

    /// Replace a primitive's properties with a JSON patch (`null` deletes a key).
    ///
    /// # Errors
    ///
    /// Rejects patches that are not JSON objects.
    pub fn modify(&mut self, identity: &str, patch_json: &str) -> Result<bool, JsValue> {
        let patch = parse_bag(patch_json)?;
        Ok(self.core.modify(&Identity::from(identity), &patch))
    }

    pub fn remove(&mut self, identity: &str) -> bool {
        self.core.remove(&Identity::from(identity))
    }

    pub fn select(&mut self, identity: &str) -> bool {
        self.core.select(&Identity::from(identity))
    }

    pub fn set_color(&mut self, color: &str) -> bool {
        self.core.set_color(color)
    }

    pub fn set_pencil_size(&mut self, size: f64) {
        self.core.ui.settings.pencil_size = size;
    }

    pub fn set_eraser_size(&mut self, size: f64) {
        self.core.ui.settings.eraser_size = size;
    }

    /// Switch to `cursor`, `pencil`, or `eraser`. Unknown names are ignored.
    pub fn set_tool(&mut self, tool: &str) -> bool {
        let Some(tool) = Tool::from_name(tool) else {
            return false;
        };
        self.core.set_tool(tool);
        true
    }

    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool, meta: bool) -> bool {
        self.core.on_key_down(&Key(key.to_owned()), Modifiers { shift, ctrl, meta })
    }

    pub fn undo(&mut self) -> bool {
        self.core.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.core.redo()
    }

    /// Identify a primitive the host drew itself, described by its property
    /// bag. Not recorded; pair with [`Whiteboard::record_change`].
    ///
    /// # Errors
    ///
    /// Rejects malformed JSON and bags whose kind tag is unknown.
    pub fn register(&mut self, snapshot_json: &str) -> Result<String, JsValue> {
        let bag = parse_bag(snapshot_json)?;
        let identity = self.core.adopt(&bag).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(identity.to_string())
    }

    /// Record an edit the host already made. `kind` is `create`, `remove`,
    /// or `modify`; snapshots are JSON property bags.
    ///
    /// # Errors
    ///
    /// Rejects unknown kinds, malformed JSON, and snapshots that do not fit
    /// the kind.
    pub fn record_change(
        &mut self,
        kind: &str,
        identity: &str,
        prior_json: Option<String>,
        posterior_json: Option<String>,
    ) -> Result<(), JsValue> {
        let kind = ChangeKind::from_name(kind).ok_or_else(|| JsValue::from_str(&format!("unknown change kind: {kind}")))?;
        let prior = prior_json.as_deref().map(parse_bag).transpose()?;
        let posterior = posterior_json.as_deref().map(parse_bag).transpose()?;
        if let Err(e) = ChangeRecord::new(kind, Identity::from(identity), prior.clone(), posterior.clone()) {
            return Err(JsValue::from_str(&e.to_string()));
        }
        self.core.record_host_change(kind, Identity::from(identity), prior, posterior);
        Ok(())
    }

    pub fn undo_len(&self) -> usize {
        self.core.history().undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.core.history().redo_len()
    }

    pub fn can_undo(&self) -> bool {
        self.core.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.core.history().can_redo()
    }

    pub fn clear_all(&mut self) {
        self.core.clear_all();
    }

    /// Apply a JSON wire message received from the socket.
    ///
    /// # Errors
    ///
    /// Rejects malformed or invalid messages.
    pub fn apply_remote(&mut self, message_json: &str) -> Result<bool, JsValue> {
        self.core
            .apply_remote_json(message_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Every live primitive in draw order as `[{identity, props}]`.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn objects_json(&self) -> Result<String, JsValue> {
        let objects: Vec<Value> = self
            .core
            .objects()
            .into_iter()
            .map(|(identity, bag)| serde_json::json!({ "identity": identity, "props": bag }))
            .collect();
        serde_json::to_string(&objects).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

fn parse_bag(json: &str) -> Result<PropertyBag, JsValue> {
    match serde_json::from_str(json) {
        Ok(Value::Object(bag)) => Ok(bag),
        Ok(_) => Err(JsValue::from_str("expected a JSON object")),
        Err(e) => Err(JsValue::from_str(&e.to_string())),
    }
}
