//! Shared store holding the three state slices.
//!
//! DESIGN
//! ======
//! Mutation only happens through [`Store::dispatch`]. Readers take cloned
//! snapshots so no lock is held across an await point. Every dispatch bumps a
//! monotonically increasing revision published on a `watch` channel; front-ends
//! re-render when it changes.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::calendar::{CalendarAction, CalendarState};
use super::chat::{ChatAction, ChatState};
use super::email::{EmailAction, EmailState};
use crate::lock;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    pub chat: ChatState,
    pub calendar: CalendarState,
    pub email: EmailState,
}

/// Any slice action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Chat(ChatAction),
    Calendar(CalendarAction),
    Email(EmailAction),
}

impl From<ChatAction> for Action {
    fn from(action: ChatAction) -> Self {
        Self::Chat(action)
    }
}

impl From<CalendarAction> for Action {
    fn from(action: CalendarAction) -> Self {
        Self::Calendar(action)
    }
}

impl From<EmailAction> for Action {
    fn from(action: EmailAction) -> Self {
        Self::Email(action)
    }
}

impl AppState {
    /// Route `action` to its slice. Other slices are left untouched.
    #[must_use]
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Chat(a) => self.chat = self.chat.reduce(a),
            Action::Calendar(a) => self.calendar = self.calendar.reduce(a),
            Action::Email(a) => self.email = self.email.reduce(a),
        }
        self
    }
}

pub struct Store {
    state: Mutex<AppState>,
    revision: watch::Sender<u64>,
    next_seq: AtomicU64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl Store {
    #[must_use]
    pub fn new(initial: AppState) -> Self {
        let (revision, _) = watch::channel(0);
        Self { state: Mutex::new(initial), revision, next_seq: AtomicU64::new(1) }
    }

    /// Apply an action and notify watchers.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        tracing::trace!(?action, "dispatch");
        {
            let mut state = lock(&self.state);
            let current = std::mem::take(&mut *state);
            *state = current.reduce(action);
        }
        self.revision.send_modify(|rev| *rev += 1);
    }

    #[must_use]
    pub fn snapshot(&self) -> AppState {
        lock(&self.state).clone()
    }

    #[must_use]
    pub fn chat(&self) -> ChatState {
        lock(&self.state).chat.clone()
    }

    #[must_use]
    pub fn calendar(&self) -> CalendarState {
        lock(&self.state).calendar.clone()
    }

    #[must_use]
    pub fn email(&self) -> EmailState {
        lock(&self.state).email.clone()
    }

    /// Number of dispatches applied so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that wakes on every dispatch.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Next sequence number for an optimistic mutation. Strictly increasing.
    pub fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }
}
