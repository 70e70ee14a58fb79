//! Calendar view logic: hidden-calendar filtering, today/upcoming grouping,
//! and event time formatting.

#[cfg(test)]
#[path = "calendar_groups_test.rs"]
mod calendar_groups_test;

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::net::types::CalendarEvent;

const TIME_FORMAT: &str = "%-I:%M %p";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupedEvents {
    /// Events starting within `now`'s local day.
    pub today: Vec<CalendarEvent>,
    /// Events starting on a later day.
    pub upcoming: Vec<CalendarEvent>,
}

impl GroupedEvents {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.upcoming.is_empty()
    }
}

/// Drop events whose source calendar is hidden. Order is kept.
#[must_use]
pub fn filter_hidden(events: &[CalendarEvent], hidden: &BTreeSet<String>) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| !hidden.contains(&e.calendar))
        .cloned()
        .collect()
}

/// Partition events into today and upcoming relative to `now`'s local day.
///
/// Day boundaries are local midnights in `now`'s time zone. Past events and
/// events with an unparseable start are omitted. Input order is kept within
/// each bucket.
#[must_use]
pub fn group_events<Tz: TimeZone>(events: &[CalendarEvent], now: &DateTime<Tz>) -> GroupedEvents {
    let tz = now.timezone();
    let today = now.date_naive();
    let bounds = today
        .succ_opt()
        .and_then(|tomorrow| Some((local_midnight(&tz, today)?, local_midnight(&tz, tomorrow)?)));
    let Some((day_start, day_end)) = bounds else {
        tracing::warn!(%today, "could not resolve local day boundaries");
        return GroupedEvents::default();
    };

    let mut grouped = GroupedEvents::default();
    for event in events {
        let Some(start) = parse_event_time(&event.start_time, &tz) else {
            tracing::warn!(event_id = %event.id, start_time = %event.start_time, "unparseable event start");
            continue;
        };
        if start >= day_start && start < day_end {
            grouped.today.push(event.clone());
        } else if start >= day_end {
            grouped.upcoming.push(event.clone());
        }
    }
    grouped
}

/// Filter hidden calendars, then group.
#[must_use]
pub fn visible_groups<Tz: TimeZone>(
    events: &[CalendarEvent],
    hidden: &BTreeSet<String>,
    now: &DateTime<Tz>,
) -> GroupedEvents {
    group_events(&filter_hidden(events, hidden), now)
}

/// Parse an event timestamp into `tz`.
///
/// Accepts RFC 3339 with offset, a naive `YYYY-MM-DDTHH:MM[:SS[.f]]` taken as
/// local time, or an all-day `YYYY-MM-DD` taken as local midnight.
#[must_use]
pub fn parse_event_time<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return resolve_local(tz, naive);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| local_midnight(tz, date))
}

/// Render `9:00 AM - 10:30 AM`, or just the start when there is no end.
/// An unparseable start is returned verbatim.
#[must_use]
pub fn format_event_time<Tz: TimeZone>(start: &str, end: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(start_at) = parse_event_time(start, tz) else {
        return start.to_owned();
    };
    let start_text = start_at.format(TIME_FORMAT).to_string();
    match end.and_then(|e| parse_event_time(e, tz)) {
        Some(end_at) => format!("{start_text} - {}", end_at.format(TIME_FORMAT)),
        None => start_text,
    }
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// Map a wall-clock time to an instant. Ambiguous times take the earlier
/// instant; times inside a DST gap shift forward one hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + TimeDelta::hours(1))).earliest())
}
