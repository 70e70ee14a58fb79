//! View logic shared by the widgets and the terminal front-end.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything here is pure: no I/O beyond loading a catalog file, no store
//! access. Widgets feed these functions snapshots and render the results.

pub mod calendar_groups;
pub mod command_input;
pub mod commands;
pub mod email_merge;
