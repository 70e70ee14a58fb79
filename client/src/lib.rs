//! Personal-assistant dashboard client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the assistant backend (REST + one realtime WebSocket),
//! `state` holds the chat/calendar/email slices as pure reducers, `util`
//! carries the view logic (event grouping, email reconciliation, command
//! catalog), and `widgets` wire the three together. [`app::Dashboard`] owns
//! the shared pieces and hands them to widgets explicitly.

pub mod app;
pub mod config;
pub mod net;
pub mod state;
pub mod util;
pub mod widgets;

#[cfg(test)]
mod test_support;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
