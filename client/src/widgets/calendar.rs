//! Calendar panel controller: initial fetch, live pushes, and per-calendar
//! visibility toggles.

#[cfg(test)]
#[path = "calendar_test.rs"]
mod calendar_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, TimeZone};

use crate::net::api::{ApiError, DashboardApi};
use crate::net::frame_client::{CalendarPush, RealtimeClient, RealtimeMessage, Subscription};
use crate::net::types::Frame;
use crate::state::Store;
use crate::state::calendar::{CalendarAction, CalendarState};
use crate::util::calendar_groups::{GroupedEvents, visible_groups};

impl From<CalendarPush> for CalendarAction {
    fn from(push: CalendarPush) -> Self {
        match push {
            CalendarPush::Add(event) => Self::AddEvent(event),
            CalendarPush::Update(event) => Self::UpdateEvent(event),
            CalendarPush::Delete(id) => Self::DeleteEvent(id),
        }
    }
}

pub struct CalendarWidget {
    store: Arc<Store>,
    api: Arc<dyn DashboardApi>,
    realtime: RealtimeClient,
    max_results: Option<u32>,
    _subscription: Subscription,
}

impl CalendarWidget {
    /// Create the widget and start applying calendar pushes to the store.
    #[must_use]
    pub fn mount(
        store: Arc<Store>,
        api: Arc<dyn DashboardApi>,
        realtime: RealtimeClient,
        max_results: Option<u32>,
    ) -> Self {
        let sink = Arc::clone(&store);
        let subscription = realtime.subscribe(move |message| {
            if let RealtimeMessage::Calendar(push) = message {
                sink.dispatch(CalendarAction::from(push.clone()));
            }
        });
        Self { store, api, realtime, max_results, _subscription: subscription }
    }

    #[must_use]
    pub fn state(&self) -> CalendarState {
        self.store.calendar()
    }

    /// Fetch the event list and replace the slice.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording it in the slice.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.store.dispatch(CalendarAction::SetLoading(true));
        match self.api.fetch_calendar_events(self.max_results).await {
            Ok(events) => {
                tracing::debug!(count = events.len(), "calendar events loaded");
                self.store.dispatch(CalendarAction::SetEvents(events));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "calendar fetch failed");
                self.store.dispatch(CalendarAction::SetError(e.to_string()));
                Err(e)
            }
        }
    }

    /// Ask the backend to start its add-event flow. Returns `false` when the
    /// socket is down and the request was dropped.
    pub fn request_add_event(&self) -> bool {
        self.realtime.send_or_warn(&Frame::typed("calendar", "request_add_event"))
    }

    pub fn toggle_calendar(&self, calendar: &str) {
        self.store.dispatch(CalendarAction::ToggleCalendar(calendar.to_owned()));
    }

    /// Visible events split into today and upcoming relative to `now`.
    #[must_use]
    pub fn grouped<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> GroupedEvents {
        let state = self.store.calendar();
        visible_groups(&state.events, &state.hidden_calendars, now)
    }

    /// Distinct calendar names among loaded events, sorted.
    #[must_use]
    pub fn calendars(&self) -> BTreeSet<String> {
        self.store.calendar().events.into_iter().map(|e| e.calendar).collect()
    }
}
