//! Shared frame model and JSON text codec for the realtime WS transport.
//!
//! The backend speaks loosely-typed JSON over a text WebSocket. Outbound
//! frames are either `{command}` or `{type, action, ...}`; inbound frames are
//! `{type, action, ...}` objects or plain chat text. This crate keeps payloads
//! flexible (`serde_json::Map`) and leaves interpretation to the client.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error returned by [`decode_frame`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not valid JSON or does not match the frame shape.
    #[error("failed to decode JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    /// The text is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,
}

/// A single structured message on the realtime wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Message family, e.g. `"calendar"` or `"chat"`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Operation within the family, e.g. `"add"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Slash-command text for command frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Every other top-level field.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Frame {
    /// Build an outbound `{command}` frame.
    #[must_use]
    pub fn command(command: impl Into<String>) -> Self {
        Self { command: Some(command.into()), ..Self::default() }
    }

    /// Build an outbound `{type, action}` frame.
    #[must_use]
    pub fn typed(kind: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            action: Some(action.into()),
            ..Self::default()
        }
    }

    /// Look up a string field among the extra fields.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// An inbound WebSocket text message after decoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Incoming {
    /// A JSON object frame.
    Frame(Frame),
    /// Plain text (non-JSON, or a bare JSON string).
    Text(String),
    /// Valid JSON that is neither a frame nor a string; carries the reason.
    Rejected(String),
}

/// Encode a frame into JSON text.
#[must_use]
pub fn encode_frame(frame: &Frame) -> String {
    // Serializing string keys and `Value`s cannot fail; an empty object is
    // the harmless fallback should that ever change.
    serde_json::to_string(frame).unwrap_or_else(|_| "{}".to_owned())
}

/// Decode JSON text into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed JSON or mistyped well-known
/// fields, and [`CodecError::NotAnObject`] for non-object JSON values.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

/// Classify an inbound text message.
///
/// Objects that decode as frames become [`Incoming::Frame`] and bare JSON
/// strings are unwrapped. Any other JSON value, including an object with
/// mistyped frame fields, is [`Incoming::Rejected`]. Only text that is not
/// JSON at all passes through as [`Incoming::Text`].
#[must_use]
pub fn decode_incoming(text: &str) -> Incoming {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Incoming::Text(text.to_owned());
    };
    match value {
        Value::String(s) => Incoming::Text(s),
        Value::Object(_) => match serde_json::from_value::<Frame>(value) {
            Ok(frame) => Incoming::Frame(frame),
            Err(e) => Incoming::Rejected(e.to_string()),
        },
        _ => Incoming::Rejected(CodecError::NotAnObject.to_string()),
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
