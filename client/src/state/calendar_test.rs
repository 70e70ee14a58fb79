use super::*;

fn event(id: &str, title: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_owned(),
        title: title.to_owned(),
        start_time: "2024-03-04T09:00:00Z".to_owned(),
        end_time: None,
        location: None,
        description: None,
        calendar: "personal@example.com".to_owned(),
    }
}

fn titles(state: &CalendarState) -> Vec<&str> {
    state.events.iter().map(|e| e.title.as_str()).collect()
}

// =============================================================
// Fetch lifecycle
// =============================================================

#[test]
fn set_events_replaces_and_clears_loading_and_error() {
    let state = CalendarState::default()
        .reduce(CalendarAction::AddEvent(event("old", "Old")))
        .reduce(CalendarAction::SetLoading(true))
        .reduce(CalendarAction::SetError("offline".to_owned()))
        .reduce(CalendarAction::SetLoading(true))
        .reduce(CalendarAction::SetEvents(vec![event("a", "A"), event("b", "B")]));
    assert_eq!(titles(&state), vec!["A", "B"]);
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}

#[test]
fn set_events_keeps_ids_unique() {
    let state = CalendarState::default().reduce(CalendarAction::SetEvents(vec![
        event("a", "A1"),
        event("b", "B"),
        event("a", "A2"),
    ]));
    assert_eq!(titles(&state), vec!["A2", "B"]);
}

#[test]
fn set_error_stops_loading() {
    let state = CalendarState::default()
        .reduce(CalendarAction::SetLoading(true))
        .reduce(CalendarAction::SetError("503".to_owned()));
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("503"));
}

// =============================================================
// Realtime mutations
// =============================================================

#[test]
fn add_event_appends_new_ids() {
    let state = CalendarState::default()
        .reduce(CalendarAction::AddEvent(event("a", "A")))
        .reduce(CalendarAction::AddEvent(event("b", "B")));
    assert_eq!(titles(&state), vec!["A", "B"]);
}

#[test]
fn add_event_with_existing_id_replaces() {
    let state = CalendarState::default()
        .reduce(CalendarAction::AddEvent(event("a", "A")))
        .reduce(CalendarAction::AddEvent(event("a", "A again")));
    assert_eq!(titles(&state), vec!["A again"]);
}

#[test]
fn update_event_replaces_matching_id_in_place() {
    let state = CalendarState::default()
        .reduce(CalendarAction::SetEvents(vec![event("a", "A"), event("b", "B")]))
        .reduce(CalendarAction::UpdateEvent(event("a", "A moved")));
    assert_eq!(titles(&state), vec!["A moved", "B"]);
}

#[test]
fn update_event_ignores_unknown_id() {
    let state = CalendarState::default()
        .reduce(CalendarAction::SetEvents(vec![event("a", "A")]))
        .reduce(CalendarAction::UpdateEvent(event("zzz", "Ghost")));
    assert_eq!(titles(&state), vec!["A"]);
}

#[test]
fn delete_event_removes_matching_id_only() {
    let state = CalendarState::default()
        .reduce(CalendarAction::SetEvents(vec![event("a", "A"), event("b", "B")]))
        .reduce(CalendarAction::DeleteEvent("a".to_owned()))
        .reduce(CalendarAction::DeleteEvent("missing".to_owned()));
    assert_eq!(titles(&state), vec!["B"]);
}

// =============================================================
// Hidden calendars
// =============================================================

#[test]
fn toggle_calendar_flips_membership() {
    let state = CalendarState::default().reduce(CalendarAction::ToggleCalendar("work".to_owned()));
    assert!(state.is_hidden("work"));
    let state = state.reduce(CalendarAction::ToggleCalendar("work".to_owned()));
    assert!(!state.is_hidden("work"));
}

#[test]
fn set_hidden_calendars_replaces_set() {
    let hidden: BTreeSet<String> = ["a".to_owned(), "b".to_owned()].into_iter().collect();
    let state = CalendarState::default()
        .reduce(CalendarAction::ToggleCalendar("c".to_owned()))
        .reduce(CalendarAction::SetHiddenCalendars(hidden.clone()));
    assert_eq!(state.hidden_calendars, hidden);
}
