//! UI state slices and the store that owns them.
//!
//! Each slice is a pure reducer over its own actions; [`store::Store`] wraps
//! them behind one lock and publishes a revision counter for re-rendering.

pub mod calendar;
pub mod chat;
pub mod email;
pub mod store;

pub use store::{Action, AppState, Store};
