//! Chat panel slice.
//!
//! Messages are append-only; the only removal is a bulk [`ChatAction::Clear`].

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use serde::{Deserialize, Serialize};

/// Who authored a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// A single chat message. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Opaque unique token (UUID v4 string).
    pub id: String,
    /// Message text; may contain markdown and code fences.
    pub text: String,
    pub sender: Sender,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    /// Create a message stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant)
    }
}

/// State for the chat panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    /// True while an assistant reply is outstanding.
    pub is_typing: bool,
    /// Last error surfaced to the user, if any.
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatAction {
    AddMessage(ChatMessage),
    SetTyping(bool),
    SetError(Option<String>),
    Clear,
}

impl ChatState {
    /// Apply `action` and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: ChatAction) -> Self {
        match action {
            ChatAction::AddMessage(msg) => self.messages.push(msg),
            ChatAction::SetTyping(typing) => self.is_typing = typing,
            ChatAction::SetError(error) => self.error = error,
            ChatAction::Clear => self.messages.clear(),
        }
        self
    }
}
