//! Room service: join/part, edit fan-out, and late-joiner hydration.
//!
//! DESIGN
//! ======
//! A room is created by its first joiner and evicted when its last client
//! parts; nothing is persisted. Every relayed edit is folded into the room's
//! primitive table and fanned out to the other clients under the same write
//! lock, so all peers of a room observe edits in one order.
//!
//! ERROR HANDLING
//! ==============
//! Fan-out is fire-and-forget. A client whose channel is full or closed
//! misses the frame; the sender is never told.

use frames::WireMessage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{AppState, RoomState};

/// Join a room, creating it if needed.
///
/// Returns the messages that bring the joiner up to date: one create per live
/// primitive, in creation order.
pub async fn join_room(state: &AppState, room: &str, client_id: Uuid, tx: mpsc::Sender<String>) -> Vec<WireMessage> {
    let mut rooms = state.rooms.write().await;
    let room_state = rooms.entry(room.to_owned()).or_insert_with(RoomState::new);
    room_state.clients.insert(client_id, tx);
    let hydration = room_state.hydration();
    info!(%room, %client_id, clients = room_state.clients.len(), objects = hydration.len(), "client joined room");
    hydration
}

/// Leave a room. Evicts the room when the last client leaves.
pub async fn part_room(state: &AppState, room: &str, client_id: Uuid) {
    let mut rooms = state.rooms.write().await;
    let Some(room_state) = rooms.get_mut(room) else {
        return;
    };
    room_state.clients.remove(&client_id);
    info!(%room, %client_id, remaining = room_state.clients.len(), "client left room");

    if room_state.clients.is_empty() {
        rooms.remove(room);
        info!(%room, "evicted room from memory");
    }
}

/// Record an edit from `client_id` and forward it to every other client in the room.
///
/// Returns the number of peers the frame was queued for.
pub async fn publish(state: &AppState, room: &str, client_id: Uuid, message: &WireMessage) -> usize {
    let text = match frames::encode_json(message) {
        Ok(text) => text,
        Err(e) => {
            warn!(%room, %client_id, error = %e, "room: cannot encode message");
            return 0;
        }
    };

    let mut rooms = state.rooms.write().await;
    let Some(room_state) = rooms.get_mut(room) else {
        debug!(%room, %client_id, "room: publish to unknown room");
        return 0;
    };
    room_state.apply(message);

    let mut delivered = 0;
    for (peer_id, tx) in &room_state.clients {
        if *peer_id == client_id {
            continue;
        }
        match tx.try_send(text.clone()) {
            Ok(()) => delivered += 1,
            Err(e) => warn!(%room, peer = %peer_id, error = %e, "room: peer frame dropped"),
        }
    }
    delivered
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
