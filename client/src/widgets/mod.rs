//! Headless widget controllers.
//!
//! SYSTEM CONTEXT
//! ==============
//! A widget reads store snapshots, calls the REST or realtime client, and
//! dispatches the outcome. Widgets own no rendering; the front-end draws their
//! state. Realtime subscriptions live exactly as long as the widget.

pub mod calendar;
pub mod chat;
pub mod email;

pub use calendar::CalendarWidget;
pub use chat::ChatWidget;
pub use email::EmailWidget;
