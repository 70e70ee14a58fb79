//! Decoding of inbound realtime text into typed messages.

#[cfg(test)]
#[path = "frame_client_parse_test.rs"]
mod frame_client_parse_test;

use frames::{Frame, Incoming};

use crate::net::types::CalendarEvent;

/// Keys that may carry chat text on an inbound frame, in priority order.
const CHAT_TEXT_KEYS: [&str; 4] = ["text", "message", "response", "content"];

/// A decoded realtime message delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RealtimeMessage {
    Calendar(CalendarPush),
    /// Assistant text pushed over the socket.
    Chat(String),
}

/// A calendar mutation pushed by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalendarPush {
    Add(CalendarEvent),
    Update(CalendarEvent),
    Delete(String),
}

/// Decode one inbound text message.
///
/// Returns `None` for frames that are recognized but unusable, and for
/// unknown `type`/`action` values; both are logged.
pub(super) fn parse_message(text: &str) -> Option<RealtimeMessage> {
    match frames::decode_incoming(text) {
        Incoming::Text(text) => {
            if text.trim().is_empty() {
                None
            } else {
                Some(RealtimeMessage::Chat(text))
            }
        }
        Incoming::Frame(frame) => parse_frame(&frame),
        Incoming::Rejected(reason) => {
            tracing::warn!(%reason, "malformed realtime frame ignored");
            None
        }
    }
}

pub(super) fn parse_frame(frame: &Frame) -> Option<RealtimeMessage> {
    match frame.kind.as_deref() {
        Some("calendar") => parse_calendar_frame(frame).map(RealtimeMessage::Calendar),
        Some("chat") => {
            let text = chat_text(frame);
            if text.is_none() {
                tracing::warn!("chat frame without text");
            }
            text.map(RealtimeMessage::Chat)
        }
        None => chat_text(frame).map(RealtimeMessage::Chat).or_else(|| {
            tracing::debug!(keys = ?frame.data.keys().collect::<Vec<_>>(), "untyped frame ignored");
            None
        }),
        Some(other) => {
            tracing::warn!(kind = other, action = ?frame.action, "unknown realtime message type");
            None
        }
    }
}

fn parse_calendar_frame(frame: &Frame) -> Option<CalendarPush> {
    match frame.action.as_deref() {
        Some("add") => frame_event(frame).map(CalendarPush::Add),
        Some("update") => frame_event(frame).map(CalendarPush::Update),
        Some("delete") => {
            let id = deleted_event_id(frame);
            if id.is_none() {
                tracing::warn!("calendar delete without event id");
            }
            id.map(CalendarPush::Delete)
        }
        other => {
            tracing::warn!(action = ?other, "unknown calendar action");
            None
        }
    }
}

fn frame_event(frame: &Frame) -> Option<CalendarEvent> {
    let Some(raw) = frame.data.get("event") else {
        tracing::warn!(action = ?frame.action, "calendar frame without event");
        return None;
    };
    match serde_json::from_value::<CalendarEvent>(raw.clone()) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, "calendar event payload malformed");
            None
        }
    }
}

/// `eventId` at top level, falling back to `event.id`.
pub(super) fn deleted_event_id(frame: &Frame) -> Option<String> {
    frame
        .str_field("eventId")
        .or_else(|| {
            frame
                .data
                .get("event")
                .and_then(|e| e.get("id"))
                .and_then(serde_json::Value::as_str)
        })
        .map(str::to_owned)
}

pub(super) fn chat_text(frame: &Frame) -> Option<String> {
    CHAT_TEXT_KEYS
        .iter()
        .find_map(|key| frame.str_field(key))
        .map(str::to_owned)
}
