//! Test doubles shared by unit tests: a scripted REST mock, an in-memory
//! realtime connector, and sample data builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::net::api::{ApiError, DashboardApi};
use crate::net::frame_client::{Connector, RealtimeError, Transport};
use crate::net::types::{CalendarEvent, Email};

// =========================================================================
// MockApi
// =========================================================================

/// Scripted [`DashboardApi`]. Each endpoint pops its next queued result; an
/// empty queue yields an empty success. Every call is recorded.
#[derive(Default)]
pub(crate) struct MockApi {
    pub chat: Mutex<VecDeque<Result<String, u16>>>,
    pub calendar: Mutex<VecDeque<Result<Vec<CalendarEvent>, u16>>>,
    pub recent: Mutex<VecDeque<Result<Vec<Email>, u16>>>,
    pub starred: Mutex<VecDeque<Result<Vec<Email>, u16>>>,
    pub content: Mutex<VecDeque<Result<Option<String>, u16>>>,
    pub mark_read: Mutex<VecDeque<Result<(), u16>>>,
    pub star: Mutex<VecDeque<Result<(), u16>>>,
    pub command: Mutex<VecDeque<Result<Value, u16>>>,
    pub calls: Mutex<Vec<String>>,
}

fn status_error(endpoint: &str, status: u16) -> ApiError {
    ApiError::Status { endpoint: endpoint.to_owned(), status }
}

fn pop<T: Default>(queue: &Mutex<VecDeque<Result<T, u16>>>, endpoint: &str) -> Result<T, ApiError> {
    match queue.lock().unwrap().pop_front() {
        Some(Ok(value)) => Ok(value),
        Some(Err(status)) => Err(status_error(endpoint, status)),
        None => Ok(T::default()),
    }
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DashboardApi for MockApi {
    async fn send_chat(&self, message: &str, _context: &Value) -> Result<String, ApiError> {
        self.record(format!("chat {message}"));
        pop(&self.chat, "/chat")
    }

    async fn fetch_calendar_events(&self, max_results: Option<u32>) -> Result<Vec<CalendarEvent>, ApiError> {
        self.record(format!("calendar {max_results:?}"));
        pop(&self.calendar, "/calendar/events")
    }

    async fn fetch_recent_emails(&self) -> Result<Vec<Email>, ApiError> {
        self.record("recent".to_owned());
        pop(&self.recent, "/api/emails/recent")
    }

    async fn fetch_starred_emails(&self, max_results: u32) -> Result<Vec<Email>, ApiError> {
        self.record(format!("starred {max_results}"));
        pop(&self.starred, "/api/emails/starred")
    }

    async fn fetch_email_content(&self, id: &str) -> Result<Option<String>, ApiError> {
        self.record(format!("content {id}"));
        pop(&self.content, "/api/emails/content")
    }

    async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        self.record(format!("mark_read {id}"));
        pop(&self.mark_read, "/api/emails/mark-read")
    }

    async fn set_starred(&self, id: &str, starred: bool) -> Result<(), ApiError> {
        self.record(format!("{} {id}", if starred { "star" } else { "unstar" }));
        pop(&self.star, "/api/emails/star")
    }

    async fn run_command(&self, command: &str) -> Result<Value, ApiError> {
        self.record(format!("command {command}"));
        pop(&self.command, "/command")
    }
}

// =========================================================================
// ScriptedConnector
// =========================================================================

/// Outcome of one connection attempt.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Dial {
    Accept,
    Fail,
}

/// The test's end of an accepted in-memory connection.
pub(crate) struct Peer {
    /// Text pushed to the client as inbound messages. Drop to disconnect.
    pub to_client: mpsc::UnboundedSender<String>,
    /// Frames the client sent.
    pub from_client: mpsc::UnboundedReceiver<String>,
}

/// Connector that follows a script of dial outcomes, failing once the script
/// runs out.
pub(crate) struct ScriptedConnector {
    script: Mutex<VecDeque<Dial>>,
    attempts: AtomicUsize,
    peers: mpsc::UnboundedSender<Peer>,
}

impl ScriptedConnector {
    pub fn new(script: Vec<Dial>) -> (Arc<Self>, mpsc::UnboundedReceiver<Peer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            script: Mutex::new(script.into()),
            attempts: AtomicUsize::new(0),
            peers,
        });
        (connector, rx)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _url: &str) -> Result<Transport, RealtimeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let dial = self.script.lock().unwrap().pop_front().unwrap_or(Dial::Fail);
        match dial {
            Dial::Fail => Err(RealtimeError::WsConnect(Box::new(
                tokio_tungstenite::tungstenite::Error::ConnectionClosed,
            ))),
            Dial::Accept => {
                let (to_client, incoming) = mpsc::unbounded_channel();
                let (outgoing, from_client) = mpsc::unbounded_channel();
                let _ = self.peers.send(Peer { to_client, from_client });
                Ok(Transport { outgoing, incoming })
            }
        }
    }
}

// =========================================================================
// Sample data
// =========================================================================

pub(crate) fn sample_event(id: &str, start_time: &str, calendar: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_owned(),
        title: format!("Event {id}"),
        start_time: start_time.to_owned(),
        end_time: None,
        location: None,
        description: None,
        calendar: calendar.to_owned(),
    }
}

pub(crate) fn sample_email(id: &str, date: &str, labels: &[&str]) -> Email {
    Email {
        id: id.to_owned(),
        from: format!("Sender {id} <{id}@example.com>"),
        subject: format!("Subject {id}"),
        date: date.to_owned(),
        snippet: format!("snippet {id}"),
        body: None,
        labels: labels.iter().map(|l| (*l).to_owned()).collect(),
    }
}
