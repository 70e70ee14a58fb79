//! Chat panel controller.
//!
//! Plain text goes to `POST /chat`. Slash-commands go over the realtime
//! socket and fall back to `POST /command` when it is down; `/help` is
//! answered locally from the catalog.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::sync::Arc;

use crate::net::api::{ApiError, DashboardApi};
use crate::net::frame_client::{RealtimeClient, RealtimeMessage, Subscription};
use crate::net::types::{Frame, command_response_text};
use crate::state::Store;
use crate::state::chat::{ChatAction, ChatMessage, ChatState};
use crate::util::commands::{Command, CommandCatalog};

const HELP_COMMAND: &str = "/help";
const EMPTY_COMMAND_REPLY: &str = "Done.";

pub struct ChatWidget {
    store: Arc<Store>,
    api: Arc<dyn DashboardApi>,
    realtime: RealtimeClient,
    catalog: Arc<CommandCatalog>,
    _subscription: Subscription,
}

impl ChatWidget {
    /// Create the widget and start appending realtime chat pushes as
    /// assistant messages.
    #[must_use]
    pub fn mount(
        store: Arc<Store>,
        api: Arc<dyn DashboardApi>,
        realtime: RealtimeClient,
        catalog: Arc<CommandCatalog>,
    ) -> Self {
        let sink = Arc::clone(&store);
        let subscription = realtime.subscribe(move |message| {
            if let RealtimeMessage::Chat(text) = message {
                sink.dispatch(ChatAction::AddMessage(ChatMessage::assistant(text.clone())));
                sink.dispatch(ChatAction::SetTyping(false));
            }
        });
        Self { store, api, realtime, catalog, _subscription: subscription }
    }

    #[must_use]
    pub fn state(&self) -> ChatState {
        self.store.chat()
    }

    /// Autocomplete candidates for the current input.
    #[must_use]
    pub fn suggestions(&self, input: &str) -> Vec<Command> {
        self.catalog.suggestions(input).into_iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.store.dispatch(ChatAction::Clear);
    }

    /// Post a user message and route it to the backend. Blank input is
    /// ignored. Failures become an assistant-visible message and the chat
    /// error; the typing flag is always cleared on return.
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.store.dispatch(ChatAction::AddMessage(ChatMessage::user(text)));
        self.store.dispatch(ChatAction::SetTyping(true));
        self.store.dispatch(ChatAction::SetError(None));

        let reply = if text.eq_ignore_ascii_case(HELP_COMMAND) {
            Ok(Some(self.catalog.help_text()))
        } else if text.starts_with('/') {
            self.run_command(text).await
        } else {
            self.api
                .send_chat(text, &serde_json::json!({}))
                .await
                .map(Some)
        };

        match reply {
            Ok(Some(reply)) => self.store.dispatch(ChatAction::AddMessage(ChatMessage::assistant(reply))),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.store.dispatch(ChatAction::SetError(Some(e.to_string())));
                self.store.dispatch(ChatAction::AddMessage(ChatMessage::assistant(format!(
                    "Sorry, I couldn't reach the assistant: {e}"
                ))));
            }
        }
        self.store.dispatch(ChatAction::SetTyping(false));
    }

    /// `Ok(None)` means the command went out over realtime and the reply will
    /// arrive as a push.
    async fn run_command(&self, command: &str) -> Result<Option<String>, ApiError> {
        match self.realtime.send(&Frame::command(command)) {
            Ok(()) => return Ok(None),
            Err(e) => tracing::debug!(error = %e, "realtime unavailable, sending command over REST"),
        }
        let value = self.api.run_command(command).await?;
        Ok(Some(
            command_response_text(&value).unwrap_or_else(|| EMPTY_COMMAND_REPLY.to_owned()),
        ))
    }
}
