//! Email panel controller.
//!
//! DESIGN
//! ======
//! Label edits (read, star) are shown immediately and confirmed by the
//! backend afterwards. Each edit takes a sequence number from the store; the
//! reducer only commits or rolls back the newest edit per `(id, field)`.
//!
//! ERROR HANDLING
//! ==============
//! - A failed recent-list fetch sets the slice error.
//! - A failed starred fetch or body fetch is logged; the panel keeps working
//!   with what it has.
//! - A failed mark-read rolls back and refetches the recent list.

#[cfg(test)]
#[path = "email_test.rs"]
mod email_test;

use std::sync::Arc;

use futures_util::future::join_all;

use crate::net::api::{ApiError, DashboardApi};
use crate::net::types::{Email, command_response_text};
use crate::state::Store;
use crate::state::chat::{ChatAction, ChatMessage};
use crate::state::email::{EmailAction, EmailState, LabelField};
use crate::util::email_merge::{EmailFilter, filter_emails, merge_email_lists};

const DRAFT_PROGRESS: &str = "I'm drafting a reply to this email...";
const DRAFT_FAILED: &str = "Sorry, I encountered an error while drafting the reply. Please try again.";

pub struct EmailWidget {
    store: Arc<Store>,
    api: Arc<dyn DashboardApi>,
    starred_max: u32,
}

impl EmailWidget {
    #[must_use]
    pub fn new(store: Arc<Store>, api: Arc<dyn DashboardApi>, starred_max: u32) -> Self {
        Self { store, api, starred_max }
    }

    #[must_use]
    pub fn state(&self) -> EmailState {
        self.store.email()
    }

    /// Fetch the recent and starred listings concurrently.
    ///
    /// # Errors
    ///
    /// Returns the recent-list error. Starred failures are only logged.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.store.dispatch(EmailAction::SetLoading(true));
        let (recent, starred) = tokio::join!(self.api.fetch_recent_emails(), self.fetch_starred_with_bodies());

        match starred {
            Ok(starred) => self.store.dispatch(EmailAction::SetStarred(starred)),
            Err(e) => tracing::warn!(error = %e, "starred email fetch failed"),
        }
        match recent {
            Ok(emails) => {
                tracing::debug!(count = emails.len(), "recent emails loaded");
                self.store.dispatch(EmailAction::SetEmails(emails));
                self.store.dispatch(EmailAction::SetError(None));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "recent email fetch failed");
                self.store.dispatch(EmailAction::SetError(Some(e.to_string())));
                Err(e)
            }
        }
    }

    async fn fetch_starred_with_bodies(&self) -> Result<Vec<Email>, ApiError> {
        let starred = self.api.fetch_starred_emails(self.starred_max).await?;
        let bodies = join_all(starred.iter().map(|email| self.api.fetch_email_content(&email.id))).await;
        Ok(starred
            .into_iter()
            .zip(bodies)
            .map(|(mut email, body)| {
                match body {
                    Ok(Some(body)) => email.body = Some(body),
                    Ok(None) => {}
                    Err(e) => tracing::warn!(email_id = %email.id, error = %e, "starred body fetch failed"),
                }
                email
            })
            .collect())
    }

    /// Merged recent + starred list, filtered by category.
    #[must_use]
    pub fn combined(&self, filter: EmailFilter) -> Vec<Email> {
        let state = self.store.email();
        filter_emails(merge_email_lists(&state.emails, &state.starred), filter)
    }

    /// Mark `id` read now and confirm with the backend.
    ///
    /// # Errors
    ///
    /// Returns the request error after rolling back and refetching the
    /// recent list.
    pub async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        let seq = self.apply(id, LabelField::Read, true);
        match self.api.mark_read(id).await {
            Ok(()) => {
                self.commit(id, LabelField::Read, seq);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(email_id = id, error = %e, "mark read failed");
                self.rollback(id, LabelField::Read, seq);
                self.store.dispatch(EmailAction::SetError(Some(e.to_string())));
                match self.api.fetch_recent_emails().await {
                    Ok(emails) => self.store.dispatch(EmailAction::SetEmails(emails)),
                    Err(refetch) => tracing::warn!(error = %refetch, "recent email refetch failed"),
                }
                Err(e)
            }
        }
    }

    /// Flip the star on `id` now and confirm with the backend. Unknown ids
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns the request error after rolling back.
    pub async fn toggle_star(&self, id: &str) -> Result<(), ApiError> {
        let Some(starred) = self.store.email().field_value(id, LabelField::Star) else {
            tracing::warn!(email_id = id, "toggle star on unknown email");
            return Ok(());
        };
        let seq = self.apply(id, LabelField::Star, !starred);
        match self.api.set_starred(id, !starred).await {
            Ok(()) => {
                self.commit(id, LabelField::Star, seq);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(email_id = id, error = %e, "star toggle failed");
                self.rollback(id, LabelField::Star, seq);
                Err(e)
            }
        }
    }

    /// Return the email with its body, fetching the body on first open. A
    /// failed fetch leaves the snippet as the only content.
    pub async fn open(&self, id: &str) -> Option<Email> {
        let email = self.store.email().email(id).cloned()?;
        if email.body.is_some() {
            return Some(email);
        }
        match self.api.fetch_email_content(id).await {
            Ok(Some(body)) => self.store.dispatch(EmailAction::SetBody { id: id.to_owned(), body }),
            Ok(None) => tracing::debug!(email_id = id, "email has no body content"),
            Err(e) => tracing::warn!(email_id = id, error = %e, "email body fetch failed"),
        }
        self.store.email().email(id).cloned()
    }

    /// Have the assistant draft a reply to `id` without marking it read.
    /// Progress and the draft land in the chat panel.
    ///
    /// # Errors
    ///
    /// Returns the failing command's error; the chat gets an apology.
    pub async fn draft_reply(&self, id: &str) -> Result<(), ApiError> {
        self.post_to_chat(DRAFT_PROGRESS.to_owned());
        let outcome = async {
            self.api.run_command(&format!("/email read {id} keep-unread")).await?;
            self.api.run_command("/email draft reply").await
        }
        .await;

        match outcome {
            Ok(draft) => {
                self.post_to_chat(command_response_text(&draft).unwrap_or_else(|| DRAFT_FAILED.to_owned()));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(email_id = id, error = %e, "draft reply failed");
                self.post_to_chat(DRAFT_FAILED.to_owned());
                Err(e)
            }
        }
    }

    fn post_to_chat(&self, text: String) {
        self.store.dispatch(ChatAction::AddMessage(ChatMessage::assistant(text)));
    }

    fn apply(&self, id: &str, field: LabelField, value: bool) -> u64 {
        let seq = self.store.next_seq();
        self.store.dispatch(EmailAction::ApplyOptimistic { id: id.to_owned(), field, value, seq });
        seq
    }

    fn commit(&self, id: &str, field: LabelField, seq: u64) {
        self.store.dispatch(EmailAction::Commit { id: id.to_owned(), field, seq });
    }

    fn rollback(&self, id: &str, field: LabelField, seq: u64) {
        self.store.dispatch(EmailAction::Rollback { id: id.to_owned(), field, seq });
    }
}
