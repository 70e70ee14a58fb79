//! Socket seam for the realtime client.
//!
//! A [`Connector`] turns a URL into a pair of text channels. The production
//! connector pumps a `tokio-tungstenite` stream; tests substitute an
//! in-memory one.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::RealtimeError;

/// An open connection as two text channels.
///
/// Dropping `outgoing` closes the socket; `incoming` yields `None` once the
/// peer goes away.
pub struct Transport {
    pub outgoing: mpsc::UnboundedSender<String>,
    pub incoming: mpsc::UnboundedReceiver<String>,
}

#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::WsConnect`] when the handshake fails.
    async fn connect(&self, url: &str) -> Result<Transport, RealtimeError>;
}

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait::async_trait]
impl Connector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Transport, RealtimeError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| RealtimeError::WsConnect(Box::new(e)))?;
        let (mut sink, mut source) = stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(text) = out_rx.recv().await {
                if let Err(e) = sink.send(Message::text(text)).await {
                    tracing::warn!(error = %e, "realtime send failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(msg) = source.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text.as_str().to_owned()).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "realtime recv error");
                        break;
                    }
                }
            }
        });

        Ok(Transport { outgoing: out_tx, incoming: in_rx })
    }
}
