//! Shared wire message and codecs for drawing-board change broadcast.
//!
//! This crate owns the wire representation used by both the `canvas` engine and
//! the relay server. One message describes one committed edit. The snapshot is
//! kept as an opaque JSON object (the surface's property bag); it travels as
//! JSON text by default, or as protobuf for compact binary transport.

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error returned by the decode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text could not be parsed as a JSON wire message.
    #[error("failed to decode json message: {0}")]
    Json(#[from] serde_json::Error),
    /// The raw bytes could not be decoded as a protobuf `WireRecord`.
    #[error("failed to decode protobuf message: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The `action` integer on the wire does not map to a known [`Action`] variant.
    #[error("invalid message action: {0}")]
    InvalidAction(i32),
    /// The message carries an empty identity.
    #[error("message identity is empty")]
    EmptyIdentity,
    /// The snapshot is not a JSON object.
    #[error("message snapshot must be an object")]
    InvalidSnapshot,
}

/// Operation carried by a wire message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// A circle, rectangle or triangle was created.
    #[serde(rename = "addShape")]
    AddShape,
    /// A path (line, arrow or freehand stroke) was created.
    #[serde(rename = "addLine")]
    AddLine,
    /// A text object was created.
    #[serde(rename = "addText")]
    AddText,
    /// A primitive was removed; the snapshot is its last state.
    #[serde(rename = "remove")]
    Remove,
    /// A primitive's properties were replaced by the snapshot.
    #[serde(rename = "modify")]
    Modify,
}

impl Action {
    /// Whether the action brings a new primitive onto the surface.
    #[must_use]
    pub fn is_create(self) -> bool {
        matches!(self, Self::AddShape | Self::AddLine | Self::AddText)
    }

    /// The wire name used in JSON messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddShape => "addShape",
            Self::AddLine => "addLine",
            Self::AddText => "addText",
            Self::Remove => "remove",
            Self::Modify => "modify",
        }
    }

    /// Convert action into wire enum integer value.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::AddShape => WireAction::AddShape as i32,
            Self::AddLine => WireAction::AddLine as i32,
            Self::AddText => WireAction::AddText as i32,
            Self::Remove => WireAction::Remove as i32,
            Self::Modify => WireAction::Modify as i32,
        }
    }

    /// Parse an action from wire enum integer value.
    fn from_i32(value: i32) -> Result<Self, CodecError> {
        match WireAction::try_from(value) {
            Ok(WireAction::AddShape) => Ok(Self::AddShape),
            Ok(WireAction::AddLine) => Ok(Self::AddLine),
            Ok(WireAction::AddText) => Ok(Self::AddText),
            Ok(WireAction::Remove) => Ok(Self::Remove),
            Ok(WireAction::Modify) => Ok(Self::Modify),
            Err(_) => Err(CodecError::InvalidAction(value)),
        }
    }
}

/// A single edit on the wire.
///
/// There are no sequence numbers and no acknowledgements: every peer applies
/// messages in arrival order and the last applied write wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// What happened to the primitive.
    pub action: Action,
    /// Stable identity of the affected primitive.
    pub identity: String,
    /// Property bag after the edit, or before it for `remove`.
    pub snapshot: Value,
}

impl WireMessage {
    /// Build a message. Does not validate; see [`WireMessage::validate`].
    pub fn new(action: Action, identity: impl Into<String>, snapshot: Value) -> Self {
        Self { action, identity: identity.into(), snapshot }
    }

    /// Check the structural rules every message must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EmptyIdentity`] or [`CodecError::InvalidSnapshot`].
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.identity.is_empty() {
            return Err(CodecError::EmptyIdentity);
        }
        if !self.snapshot.is_object() {
            return Err(CodecError::InvalidSnapshot);
        }
        Ok(())
    }
}

/// Encode a message as a JSON object string.
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the snapshot cannot be serialized.
pub fn encode_json(message: &WireMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode and validate a JSON wire message.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text and the validation errors of
/// [`WireMessage::validate`].
pub fn decode_json(text: &str) -> Result<WireMessage, CodecError> {
    let message: WireMessage = serde_json::from_str(text)?;
    message.validate()?;
    Ok(message)
}

/// Encode a message into protobuf bytes.
#[must_use]
pub fn encode_binary(message: &WireMessage) -> Vec<u8> {
    let wire = message_to_wire(message);

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Encoding into a growable Vec cannot run out of buffer space.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode and validate protobuf bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes,
/// [`CodecError::InvalidAction`] for out-of-range actions, and the validation
/// errors of [`WireMessage::validate`].
pub fn decode_binary(bytes: &[u8]) -> Result<WireMessage, CodecError> {
    let wire = WireRecord::decode(bytes)?;
    let message = wire_to_message(wire)?;
    message.validate()?;
    Ok(message)
}

fn message_to_wire(message: &WireMessage) -> WireRecord {
    WireRecord {
        action: message.action.as_i32(),
        identity: message.identity.clone(),
        snapshot: Some(json_to_proto_value(&message.snapshot)),
    }
}

fn wire_to_message(wire: WireRecord) -> Result<WireMessage, CodecError> {
    Ok(WireMessage {
        action: Action::from_i32(wire.action)?,
        identity: wire.identity,
        snapshot: wire
            .snapshot
            .map_or(Value::Object(Map::new()), |v| proto_to_json_value(&v)),
    })
}

fn json_to_proto_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => {
            prost_types::value::Kind::NullValue(prost_types::NullValue::NullValue as i32)
        }
        Value::Bool(v) => prost_types::value::Kind::BoolValue(*v),
        Value::Number(v) => prost_types::value::Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => prost_types::value::Kind::StringValue(v.clone()),
        Value::Array(v) => prost_types::value::Kind::ListValue(prost_types::ListValue {
            values: v.iter().map(json_to_proto_value).collect(),
        }),
        Value::Object(v) => prost_types::value::Kind::StructValue(prost_types::Struct {
            fields: v
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto_value(v)))
                .collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

fn proto_to_json_value(value: &prost_types::Value) -> Value {
    let Some(kind) = &value.kind else {
        return Value::Null;
    };

    match kind {
        prost_types::value::Kind::NullValue(_) => Value::Null,
        prost_types::value::Kind::NumberValue(v) => {
            serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number)
        }
        prost_types::value::Kind::StringValue(v) => Value::String(v.clone()),
        prost_types::value::Kind::BoolValue(v) => Value::Bool(*v),
        prost_types::value::Kind::StructValue(v) => Value::Object(
            v.fields
                .iter()
                .map(|(k, v)| (k.clone(), proto_to_json_value(v)))
                .collect(),
        ),
        prost_types::value::Kind::ListValue(v) => {
            Value::Array(v.values.iter().map(proto_to_json_value).collect())
        }
    }
}

#[derive(Clone, PartialEq, Message)]
struct WireRecord {
    #[prost(enumeration = "WireAction", tag = "1")]
    action: i32,
    #[prost(string, tag = "2")]
    identity: String,
    #[prost(message, optional, tag = "3")]
    snapshot: Option<prost_types::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
enum WireAction {
    AddShape = 0,
    AddLine = 1,
    AddText = 2,
    Remove = 3,
    Modify = 4,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
