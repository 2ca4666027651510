//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds a map of live rooms. Each room keeps the latest snapshot of every
//! primitive its peers have announced, plus the outbound channel of every
//! connected client. Rooms live only while at least one client is connected.

use std::collections::HashMap;
use std::sync::Arc;

use frames::{Action, WireMessage};
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

// =============================================================================
// ROOM OBJECT
// =============================================================================

/// Latest known state of one primitive in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomObject {
    /// Arrival order of the primitive's first creation; hydration replays in this order.
    pub seq: u64,
    /// The create action that announced the primitive.
    pub action: Action,
    pub snapshot: Value,
}

// =============================================================================
// ROOM STATE
// =============================================================================

/// Per-room live state.
pub struct RoomState {
    /// Current primitives keyed by identity.
    pub objects: HashMap<String, RoomObject>,
    /// Connected clients: `client_id` -> sender for outgoing JSON text frames.
    pub clients: HashMap<Uuid, mpsc::Sender<String>>,
    next_seq: u64,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self { objects: HashMap::new(), clients: HashMap::new(), next_seq: 0 }
    }

    /// Fold one relayed edit into the room's primitive table.
    ///
    /// Creates insert (or overwrite a live identity), modifies replace the
    /// snapshot of a known identity, removes drop it. Modifies and removes of
    /// unknown identities leave the table alone.
    pub fn apply(&mut self, message: &WireMessage) {
        match message.action {
            Action::AddShape | Action::AddLine | Action::AddText => {
                if let Some(existing) = self.objects.get_mut(&message.identity) {
                    existing.action = message.action;
                    existing.snapshot = message.snapshot.clone();
                    return;
                }
                let seq = self.next_seq;
                self.next_seq += 1;
                self.objects.insert(
                    message.identity.clone(),
                    RoomObject { seq, action: message.action, snapshot: message.snapshot.clone() },
                );
            }
            Action::Modify => {
                if let Some(existing) = self.objects.get_mut(&message.identity) {
                    existing.snapshot = message.snapshot.clone();
                }
            }
            Action::Remove => {
                self.objects.remove(&message.identity);
            }
        }
    }

    /// One create message per live primitive, in creation order.
    #[must_use]
    pub fn hydration(&self) -> Vec<WireMessage> {
        let mut objects: Vec<(&String, &RoomObject)> = self.objects.iter().collect();
        objects.sort_by_key(|(_, object)| object.seq);
        objects
            .into_iter()
            .map(|(identity, object)| WireMessage::new(object.action, identity.clone(), object.snapshot.clone()))
            .collect()
    }
}

impl Default for RoomState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, RoomState>>>,
    /// Capacity of each connection's outbound channel.
    pub client_buffer: usize,
}

impl AppState {
    #[must_use]
    pub fn new(client_buffer: usize) -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())), client_buffer }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
