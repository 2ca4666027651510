//! WebSocket handler: per-room edit relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, joins the room named in the path, and
//! enters a `select!` loop:
//! - Incoming client messages → decode + validate → publish to room peers
//! - Frames from room peers → forward to client
//!
//! Clients may send JSON text or protobuf binary; peers always receive JSON
//! text. Invalid input is logged and dropped, the connection stays open.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join room → send one create per live primitive
//! 2. Client sends edits → validate → fold into room state → fan out
//! 3. Close → part room (evicts it when empty)

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use frames::{CodecError, WireMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, Path(room): Path<String>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state, room))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, room: String) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for frames from room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<String>(state.client_buffer);

    let hydration = services::room::join_room(&state, &room, client_id, client_tx).await;
    info!(%client_id, %room, "ws: client connected");

    if send_hydration(&mut socket, &hydration).await.is_ok() {
        loop {
            tokio::select! {
                msg = socket.recv() => {
                    let Some(Ok(msg)) = msg else { break };
                    match msg {
                        Message::Text(text) => {
                            relay_inbound(&state, &room, client_id, frames::decode_json(text.as_str())).await;
                        }
                        Message::Binary(bytes) => {
                            relay_inbound(&state, &room, client_id, frames::decode_binary(&bytes)).await;
                        }
                        Message::Close(_) => break,
                        Message::Ping(_) | Message::Pong(_) => {}
                    }
                }
                Some(text) = client_rx.recv() => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    services::room::part_room(&state, &room, client_id).await;
    info!(%client_id, %room, "ws: client disconnected");
}

async fn send_hydration(socket: &mut WebSocket, hydration: &[WireMessage]) -> Result<(), axum::Error> {
    for message in hydration {
        match frames::encode_json(message) {
            Ok(text) => socket.send(Message::Text(text.into())).await?,
            Err(e) => warn!(identity = %message.identity, error = %e, "ws: cannot encode hydration message"),
        }
    }
    Ok(())
}

// =============================================================================
// INBOUND
// =============================================================================

async fn relay_inbound(state: &AppState, room: &str, client_id: Uuid, decoded: Result<WireMessage, CodecError>) {
    match decoded {
        Ok(message) => {
            let delivered = services::room::publish(state, room, client_id, &message).await;
            debug!(
                %client_id,
                %room,
                identity = %message.identity,
                action = message.action.as_str(),
                delivered,
                "ws: relayed edit"
            );
        }
        Err(e) => warn!(%client_id, %room, error = %e, "ws: invalid inbound message dropped"),
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
