//! Realtime client for the backend event WebSocket.
//!
//! The `RealtimeClient` owns one logical connection: it dials, serves the
//! socket until it drops, and re-dials according to a [`ReconnectPolicy`].
//! Inbound text is decoded into [`RealtimeMessage`]s and fanned out to every
//! subscriber in registration order.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures are logged and fed into the reconnect loop; callers only
//! see them as [`ConnectionStatus`] changes. Once the policy is exhausted the
//! status becomes [`ConnectionStatus::Failed`] and the task stops. A handler
//! that panics is logged and skipped so the remaining handlers still run.

#[path = "frame_client_parse.rs"]
mod frame_client_parse;
#[path = "frame_client_reconnect.rs"]
mod frame_client_reconnect;
#[path = "frame_client_transport.rs"]
mod frame_client_transport;

#[cfg(test)]
#[path = "frame_client_test.rs"]
mod frame_client_test;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

pub use self::frame_client_parse::{CalendarPush, RealtimeMessage};
pub use self::frame_client_reconnect::ReconnectPolicy;
pub use self::frame_client_transport::{Connector, Transport, TungsteniteConnector};
use crate::lock;
use crate::net::types::Frame;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("realtime connection is not open")]
    NotConnected,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Reconnect attempts exhausted; the client no longer dials.
    Failed,
}

/// Callback invoked for every decoded inbound message.
pub type MessageHandler = Arc<dyn Fn(&RealtimeMessage) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Unsubscribes its handler when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    inner: Weak<Inner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove(self.id);
        }
    }
}

/// Cheaply cloneable handle to the shared connection.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<Inner>,
}

struct Inner {
    url: String,
    policy: ReconnectPolicy,
    connector: Arc<dyn Connector>,
    subscribers: Mutex<Vec<(SubscriptionId, MessageHandler)>>,
    next_subscription: AtomicU64,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    status: watch::Sender<ConnectionStatus>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RealtimeClient {
    /// Client for `url` using the WebSocket connector.
    #[must_use]
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self::with_connector(url, policy, Arc::new(TungsteniteConnector))
    }

    #[must_use]
    pub fn with_connector(url: impl Into<String>, policy: ReconnectPolicy, connector: Arc<dyn Connector>) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                policy,
                connector,
                subscribers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
                outbound: Mutex::new(None),
                status,
                task: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Start the connection task. A no-op while the task is still running;
    /// after [`ConnectionStatus::Failed`] or [`Self::shutdown`] it dials anew.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut task = lock(&self.inner.task);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(run_connection(inner)));
    }

    /// Serialize and transmit a frame.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::NotConnected`] when no socket is open, so the
    /// caller can fall back to another channel.
    pub fn send(&self, frame: &Frame) -> Result<(), RealtimeError> {
        let outbound = lock(&self.inner.outbound);
        let Some(tx) = outbound.as_ref() else {
            return Err(RealtimeError::NotConnected);
        };
        tx.send(frames::encode_frame(frame)).map_err(|_| RealtimeError::NotConnected)
    }

    /// Like [`Self::send`], but logs and drops the frame when disconnected.
    pub fn send_or_warn(&self, frame: &Frame) -> bool {
        match self.send(frame) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?frame.kind, action = ?frame.action, "realtime frame dropped");
                false
            }
        }
    }

    /// Register a handler. Handlers run in registration order.
    pub fn on_message(&self, handler: impl Fn(&RealtimeMessage) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.subscribers).push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if `id` was not registered.
    pub fn off(&self, id: SubscriptionId) -> bool {
        self.inner.remove(id)
    }

    /// Register a handler tied to the returned guard's lifetime.
    pub fn subscribe(&self, handler: impl Fn(&RealtimeMessage) + Send + Sync + 'static) -> Subscription {
        let id = self.on_message(handler);
        Subscription { id, inner: Arc::downgrade(&self.inner) }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.borrow()
    }

    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    /// Stop the connection task and close the socket.
    pub fn shutdown(&self) {
        if let Some(task) = lock(&self.inner.task).take() {
            task.abort();
        }
        lock(&self.inner.outbound).take();
        self.inner.set_status(ConnectionStatus::Disconnected);
    }
}

impl Inner {
    fn set_status(&self, status: ConnectionStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            tracing::debug!(?previous, ?status, "realtime status");
        }
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    fn dispatch(&self, message: &RealtimeMessage) {
        // Snapshot so handlers may subscribe or unsubscribe while running.
        let handlers: Vec<MessageHandler> = lock(&self.subscribers)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            if std::panic::catch_unwind(AssertUnwindSafe(|| handler(message))).is_err() {
                tracing::error!("realtime subscriber panicked");
            }
        }
    }

    async fn serve(&self, transport: Transport) {
        let Transport { outgoing, mut incoming } = transport;
        *lock(&self.outbound) = Some(outgoing);
        self.set_status(ConnectionStatus::Connected);

        while let Some(text) = incoming.recv().await {
            if let Some(message) = frame_client_parse::parse_message(&text) {
                self.dispatch(&message);
            }
        }

        lock(&self.outbound).take();
    }
}

async fn run_connection(inner: Arc<Inner>) {
    let mut failures: u32 = 0;
    loop {
        inner.set_status(ConnectionStatus::Connecting);
        match inner.connector.connect(&inner.url).await {
            Ok(transport) => {
                failures = 0;
                tracing::info!(url = %inner.url, "realtime connected");
                inner.serve(transport).await;
                tracing::info!(url = %inner.url, "realtime disconnected");
                inner.set_status(ConnectionStatus::Disconnected);
                tokio::time::sleep(inner.policy.delay_for(1)).await;
            }
            Err(e) => {
                failures += 1;
                if inner.policy.is_exhausted(failures) {
                    tracing::error!(error = %e, attempts = failures, "realtime reconnect attempts exhausted");
                    inner.set_status(ConnectionStatus::Failed);
                    return;
                }
                let delay = inner.policy.delay_for(failures);
                tracing::warn!(error = %e, attempt = failures, ?delay, "realtime connect failed");
                inner.set_status(ConnectionStatus::Disconnected);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
