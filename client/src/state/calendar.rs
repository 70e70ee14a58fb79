//! Calendar slice: the event set plus the user's hidden-calendar toggles.
//!
//! Invariant: event ids are unique within `events`. Every action that inserts
//! an event replaces an existing entry with the same id instead of appending.

#[cfg(test)]
#[path = "calendar_test.rs"]
mod calendar_test;

use std::collections::BTreeSet;

use crate::net::types::CalendarEvent;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalendarState {
    pub events: Vec<CalendarEvent>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Calendar identifiers filtered out before grouping.
    pub hidden_calendars: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalendarAction {
    /// Replace the event set wholesale; clears loading and error.
    SetEvents(Vec<CalendarEvent>),
    AddEvent(CalendarEvent),
    /// Replace the event with the same id; unknown ids are ignored.
    UpdateEvent(CalendarEvent),
    DeleteEvent(String),
    SetLoading(bool),
    /// Record a fetch failure; clears loading.
    SetError(String),
    ToggleCalendar(String),
    SetHiddenCalendars(BTreeSet<String>),
}

impl CalendarState {
    /// Apply `action` and return the next state.
    #[must_use]
    pub fn reduce(mut self, action: CalendarAction) -> Self {
        match action {
            CalendarAction::SetEvents(events) => {
                self.events = dedupe_by_id(events);
                self.is_loading = false;
                self.error = None;
            }
            CalendarAction::AddEvent(event) => {
                if let Some(existing) = self.events.iter_mut().find(|e| e.id == event.id) {
                    *existing = event;
                } else {
                    self.events.push(event);
                }
            }
            CalendarAction::UpdateEvent(event) => {
                if let Some(existing) = self.events.iter_mut().find(|e| e.id == event.id) {
                    *existing = event;
                }
            }
            CalendarAction::DeleteEvent(id) => self.events.retain(|e| e.id != id),
            CalendarAction::SetLoading(loading) => self.is_loading = loading,
            CalendarAction::SetError(error) => {
                self.error = Some(error);
                self.is_loading = false;
            }
            CalendarAction::ToggleCalendar(calendar) => {
                if !self.hidden_calendars.remove(&calendar) {
                    self.hidden_calendars.insert(calendar);
                }
            }
            CalendarAction::SetHiddenCalendars(hidden) => self.hidden_calendars = hidden,
        }
        self
    }

    #[must_use]
    pub fn is_hidden(&self, calendar: &str) -> bool {
        self.hidden_calendars.contains(calendar)
    }
}

/// Later duplicates overwrite the first occurrence in place.
fn dedupe_by_id(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut out: Vec<CalendarEvent> = Vec::with_capacity(events.len());
    for event in events {
        if let Some(existing) = out.iter_mut().find(|e| e.id == event.id) {
            *existing = event;
        } else {
            out.push(event);
        }
    }
    out
}
