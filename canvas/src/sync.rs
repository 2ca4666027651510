//! Sync broadcaster: the boundary between the local history and remote peers.
//!
//! DESIGN
//! ======
//! Outbound, every committed local change becomes one [`WireMessage`] handed to
//! a [`Broadcaster`]. Delivery is fire-and-forget: a failed send is logged by
//! the engine and the local edit stands.
//!
//! Inbound, a message is translated into the same [`SurfaceOp`] that undo and
//! redo use, and the engine applies it straight to the surface. Remote edits
//! never enter the history, so they can never be undone locally.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::collections::VecDeque;

use frames::{Action, CodecError, WireMessage};
use serde_json::Value;

use crate::history::{ChangeKind, ChangeRecord, SurfaceOp};
use crate::identity::Identity;
use crate::kinds::KindRegistry;

/// Failure to hand a message to the transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection is gone.
    #[error("transport closed")]
    Closed,
    /// The transport refused the message.
    #[error("send failed: {0}")]
    Send(String),
    /// The message could not be encoded for this transport.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Receives every committed local change.
pub trait Broadcaster {
    /// Hand one message to the transport. Must not block.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the message could not be handed off.
    fn broadcast(&mut self, message: &WireMessage) -> Result<(), TransportError>;
}

impl<F> Broadcaster for F
where
    F: FnMut(&WireMessage) -> Result<(), TransportError>,
{
    fn broadcast(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        self(message)
    }
}

/// Broadcaster for a board nobody else is watching.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Broadcaster for Offline {
    fn broadcast(&mut self, _message: &WireMessage) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Queue of outbound messages the host drains into its socket.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<WireMessage>,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued message, oldest first.
    pub fn drain(&mut self) -> Vec<WireMessage> {
        self.queue.drain(..).collect()
    }

    /// Queued messages, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &WireMessage> {
        self.queue.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Broadcaster for Outbox {
    fn broadcast(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        self.queue.push_back(message.clone());
        Ok(())
    }
}

/// Describe a committed change to peers.
///
/// Creates are announced by kind (`addShape`, `addLine`, `addText`); a create
/// whose kind tag is not registered is announced as `addShape`.
#[must_use]
pub fn outbound_message(record: &ChangeRecord, kinds: &KindRegistry) -> WireMessage {
    let snapshot = record.snapshot().cloned().unwrap_or_default();
    let action = match record.kind() {
        ChangeKind::Create => kinds
            .kind_of(&snapshot)
            .map_or(Action::AddShape, |kind| kind.create_action()),
        ChangeKind::Remove => Action::Remove,
        ChangeKind::Modify => Action::Modify,
    };
    WireMessage::new(action, record.identity().as_str(), Value::Object(snapshot))
}

/// Translate a remote message into the operation it asks for.
///
/// `add*` places the snapshot (or overwrites it if the identity is already
/// live), `modify` overwrites, `remove` removes.
///
/// # Errors
///
/// Returns the validation errors of [`WireMessage::validate`].
pub fn inbound_op(message: &WireMessage) -> Result<(Identity, SurfaceOp), CodecError> {
    message.validate()?;
    let Value::Object(bag) = &message.snapshot else {
        return Err(CodecError::InvalidSnapshot);
    };
    let identity = Identity::from(message.identity.as_str());
    let op = match message.action {
        Action::AddShape | Action::AddLine | Action::AddText => SurfaceOp::Place(bag.clone()),
        Action::Modify => SurfaceOp::Overwrite(bag.clone()),
        Action::Remove => SurfaceOp::Remove,
    };
    Ok((identity, op))
}
