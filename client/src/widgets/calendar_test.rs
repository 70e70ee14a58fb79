use super::*;
use crate::net::frame_client::{ConnectionStatus, ReconnectPolicy};
use crate::test_support::{Dial, MockApi, Peer, ScriptedConnector, sample_event};
use chrono::FixedOffset;
use std::time::Duration;

fn offline_realtime() -> RealtimeClient {
    let (connector, _peers) = ScriptedConnector::new(vec![]);
    RealtimeClient::with_connector("ws://test/ws", ReconnectPolicy::default(), connector)
}

async fn online_realtime() -> (RealtimeClient, Peer) {
    let (connector, mut peers) = ScriptedConnector::new(vec![Dial::Accept]);
    let realtime = RealtimeClient::with_connector(
        "ws://test/ws",
        ReconnectPolicy { max_attempts: 1, base_delay: Duration::from_millis(10) },
        connector,
    );
    realtime.connect();
    let peer = peers.recv().await.unwrap();
    realtime.watch_status().wait_for(|s| *s == ConnectionStatus::Connected).await.unwrap();
    (realtime, peer)
}

fn mount(api: Arc<MockApi>, realtime: RealtimeClient) -> (CalendarWidget, Arc<Store>) {
    let store = Arc::new(Store::default());
    let widget = CalendarWidget::mount(store.clone(), api, realtime, Some(25));
    (widget, store)
}

fn ids(state: &CalendarState) -> Vec<String> {
    state.events.iter().map(|e| e.id.clone()).collect()
}

// =============================================================
// refresh
// =============================================================

#[tokio::test]
async fn refresh_replaces_events() {
    let api = MockApi::new();
    api.calendar.lock().unwrap().push_back(Ok(vec![
        sample_event("a", "2024-03-04T09:00:00Z", "work"),
        sample_event("b", "2024-03-05T09:00:00Z", "home"),
    ]));
    let (widget, _) = mount(api.clone(), offline_realtime());

    widget.refresh().await.unwrap();

    let state = widget.state();
    assert_eq!(ids(&state), vec!["a", "b"]);
    assert!(!state.is_loading);
    assert_eq!(api.calls(), vec!["calendar Some(25)"]);
}

#[tokio::test]
async fn refresh_failure_records_error_and_keeps_events() {
    let api = MockApi::new();
    api.calendar.lock().unwrap().push_back(Ok(vec![sample_event("a", "2024-03-04T09:00:00Z", "work")]));
    api.calendar.lock().unwrap().push_back(Err(503));
    let (widget, _) = mount(api, offline_realtime());

    widget.refresh().await.unwrap();
    assert!(widget.refresh().await.is_err());

    let state = widget.state();
    assert_eq!(ids(&state), vec!["a"]);
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("/calendar/events returned status 503"));
}

// =============================================================
// Realtime pushes
// =============================================================

#[tokio::test(start_paused = true)]
async fn pushes_add_update_and_delete_events() {
    let (realtime, peer) = online_realtime().await;
    let (widget, store) = mount(MockApi::new(), realtime);
    let mut rev = store.watch();

    peer.to_client
        .send(r#"{"type":"calendar","action":"add","event":{"id":"e1","title":"Standup","startTime":"2024-03-04T09:00:00Z","calendar":"work"}}"#.to_owned())
        .unwrap();
    rev.wait_for(|_| store.calendar().events.len() == 1).await.unwrap();

    peer.to_client
        .send(r#"{"type":"calendar","action":"update","event":{"id":"e1","title":"Retro","startTime":"2024-03-04T10:00:00Z","calendar":"work"}}"#.to_owned())
        .unwrap();
    rev.wait_for(|_| store.calendar().events.first().is_some_and(|e| e.title == "Retro")).await.unwrap();

    peer.to_client
        .send(r#"{"type":"calendar","action":"delete","eventId":"e1"}"#.to_owned())
        .unwrap();
    rev.wait_for(|_| store.calendar().events.is_empty()).await.unwrap();
    assert!(widget.state().events.is_empty());
}

#[tokio::test(start_paused = true)]
async fn request_add_event_sends_typed_frame() {
    let (realtime, mut peer) = online_realtime().await;
    let (widget, _) = mount(MockApi::new(), realtime);

    assert!(widget.request_add_event());
    assert_eq!(
        peer.from_client.recv().await.unwrap(),
        r#"{"type":"calendar","action":"request_add_event"}"#
    );
}

#[test]
fn request_add_event_is_dropped_when_offline() {
    let (widget, _) = mount(MockApi::new(), offline_realtime());
    assert!(!widget.request_add_event());
}

#[test]
fn push_converts_to_action() {
    let event = sample_event("x", "2024-03-04T09:00:00Z", "work");
    assert_eq!(CalendarAction::from(CalendarPush::Add(event.clone())), CalendarAction::AddEvent(event.clone()));
    assert_eq!(CalendarAction::from(CalendarPush::Update(event.clone())), CalendarAction::UpdateEvent(event));
    assert_eq!(
        CalendarAction::from(CalendarPush::Delete("x".to_owned())),
        CalendarAction::DeleteEvent("x".to_owned())
    );
}

// =============================================================
// Visibility and grouping
// =============================================================

#[test]
fn toggled_calendars_are_hidden_from_groups() {
    let (widget, store) = mount(MockApi::new(), offline_realtime());
    store.dispatch(CalendarAction::SetEvents(vec![
        sample_event("work-today", "2024-03-04T16:00:00+02:00", "work"),
        sample_event("home-today", "2024-03-04T18:00:00+02:00", "home"),
        sample_event("home-later", "2024-03-06T09:00:00+02:00", "home"),
    ]));
    let now = FixedOffset::east_opt(2 * 3600).unwrap().with_ymd_and_hms(2024, 3, 4, 15, 30, 0).unwrap();

    let all = widget.grouped(&now);
    assert_eq!(all.today.len(), 2);
    assert_eq!(all.upcoming.len(), 1);

    widget.toggle_calendar("home");
    let visible = widget.grouped(&now);
    assert_eq!(visible.today.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["work-today"]);
    assert!(visible.upcoming.is_empty());

    widget.toggle_calendar("home");
    assert_eq!(widget.grouped(&now), all);
}

#[test]
fn calendars_lists_distinct_sorted_names() {
    let (widget, store) = mount(MockApi::new(), offline_realtime());
    store.dispatch(CalendarAction::SetEvents(vec![
        sample_event("1", "2024-03-04T09:00:00Z", "work"),
        sample_event("2", "2024-03-04T10:00:00Z", "home"),
        sample_event("3", "2024-03-04T11:00:00Z", "work"),
    ]));
    assert_eq!(widget.calendars().into_iter().collect::<Vec<_>>(), vec!["home", "work"]);
}

#[test]
fn dropping_widget_unsubscribes() {
    let realtime = offline_realtime();
    let (widget, _) = mount(MockApi::new(), realtime.clone());
    assert_eq!(realtime.subscriber_count(), 1);
    drop(widget);
    assert_eq!(realtime.subscriber_count(), 0);
}
