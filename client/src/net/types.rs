//! Shared wire-protocol DTOs for the client/backend boundary.
//!
//! DESIGN
//! ======
//! These types mirror the backend's JSON payloads so serde round-trips stay
//! lossless. Field names follow the backend (`startTime`, `endTime`).

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

pub use frames::Frame;

/// Gmail-style label marking an unread email.
pub const LABEL_UNREAD: &str = "UNREAD";
/// Gmail-style label marking a starred email.
pub const LABEL_STARRED: &str = "STARRED";

/// A calendar event as served by `/calendar/events` and realtime pushes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Backend-assigned event identifier.
    pub id: String,
    /// Event summary line.
    pub title: String,
    /// ISO datetime (or all-day date) the event starts.
    pub start_time: String,
    /// ISO datetime the event ends, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source calendar identifier (usually an address).
    #[serde(default)]
    pub calendar: String,
}

/// An email summary as served by `/api/emails/*`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    /// Raw `From` header, e.g. `"Ada <ada@example.com>"`.
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    /// Raw `Date` header.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub snippet: String,
    /// Full body, fetched lazily from `/api/emails/{id}/content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Email {
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    #[must_use]
    pub fn is_unread(&self) -> bool {
        self.has_label(LABEL_UNREAD)
    }

    #[must_use]
    pub fn is_starred(&self) -> bool {
        self.has_label(LABEL_STARRED)
    }

    /// Add or remove `label`, keeping the label list free of duplicates.
    pub fn set_label(&mut self, label: &str, present: bool) {
        if present {
            if !self.has_label(label) {
                self.labels.push(label.to_owned());
            }
        } else {
            self.labels.retain(|l| l != label);
        }
    }

    /// Merge another copy's labels into this one (set union, order kept).
    pub fn union_labels(&mut self, other: &[String]) {
        for label in other {
            self.set_label(label, true);
        }
    }
}

/// Body of `POST /chat`.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub context: &'a serde_json::Value,
}

/// Response of `POST /chat`.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Response of the email list endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmailListResponse {
    #[serde(default)]
    pub emails: Vec<Email>,
}

/// Response of `GET /api/emails/{id}/content`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmailContentResponse {
    pub html: Option<String>,
    pub body: Option<String>,
}

impl EmailContentResponse {
    /// HTML content when present, plain text otherwise.
    #[must_use]
    pub fn into_body(self) -> Option<String> {
        self.html.filter(|h| !h.is_empty()).or(self.body)
    }
}

/// Body of `POST /command`.
#[derive(Clone, Debug, Serialize)]
pub struct CommandRequest<'a> {
    pub command: &'a str,
}

/// Extract displayable text from a `POST /command` response.
///
/// The backend answers with `{data}` for draft commands and `{response}` or
/// `{message}` elsewhere; a bare string is accepted too.
#[must_use]
pub fn command_response_text(value: &serde_json::Value) -> Option<String> {
    if let Some(s) = value.as_str() {
        return Some(s.to_owned());
    }
    ["data", "response", "message"]
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        })
}
