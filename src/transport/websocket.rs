//! WebSocket transport: one logical peer per connection, one JSON object per
//! text frame, built on `tokio-tungstenite`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::{tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::{AcpError, AcpResult};
use crate::message::JsonRpcMessage;
use crate::transport::{IncomingHandler, Transport};

/// Tunables for a WebSocket transport.
#[derive(Debug, Clone)]
pub struct WebSocketTransportConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub idle_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for WebSocketTransportConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: "/acp".to_string(),
            idle_timeout: Duration::from_secs(30 * 60),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A [`Transport`] over one already-established WebSocket connection (client
/// or server side, both are the same logical peer once the handshake has
/// completed, so this type does not distinguish them).
pub struct WebSocketTransport {
    outbound_tx: mpsc::UnboundedSender<JsonRpcMessage>,
    outbound_rx: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    stream: tokio::sync::Mutex<Option<WsStream>>,
    config: WebSocketTransportConfig,
    started: AtomicBool,
    closed: AtomicBool,
    terminated: Arc<Notify>,
    tasks: tokio::sync::Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl WebSocketTransport {
    /// Connect as a client to `ws://{host}:{port}{path}`.
    pub async fn connect(config: WebSocketTransportConfig) -> AcpResult<Self> {
        let url = format!("ws://{}:{}{}", config.host, config.port, config.path);
        let (stream, _response) = tokio::time::timeout(
            config.connect_timeout,
            tokio_tungstenite::connect_async(&url),
        )
        .await
        .map_err(|_| AcpError::Transport(format!("connect to {url} timed out")))?
        .map_err(|e| AcpError::Transport(format!("connect to {url} failed: {e}")))?;

        Ok(Self::from_stream(stream, config))
    }

    /// Wrap an already-accepted server-side connection.
    pub fn from_accepted(stream: WsStream, config: WebSocketTransportConfig) -> Self {
        Self::from_stream(stream, config)
    }

    fn from_stream(stream: WsStream, config: WebSocketTransportConfig) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            outbound_tx,
            outbound_rx: tokio::sync::Mutex::new(Some(outbound_rx)),
            stream: tokio::sync::Mutex::new(Some(stream)),
            config,
            started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            terminated: Arc::new(Notify::new()),
            tasks: tokio::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn start(&self, handler: Arc<dyn IncomingHandler>) -> AcpResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AcpError::InvalidState("transport already started".into()));
        }

        let stream = self
            .stream
            .lock()
            .await
            .take()
            .ok_or_else(|| AcpError::InvalidState("transport already started".into()))?;
        let (mut sink, mut source) = stream.split();
        let mut outbound_rx = self
            .outbound_rx
            .lock()
            .await
            .take()
            .ok_or_else(|| AcpError::InvalidState("transport already started".into()))?;

        let terminated = Arc::clone(&self.terminated);
        let idle_timeout = self.config.idle_timeout;

        let reader_task = tokio::spawn(async move {
            loop {
                let next = tokio::time::timeout(idle_timeout, source.next()).await;
                let frame = match next {
                    Ok(Some(Ok(frame))) => frame,
                    Ok(Some(Err(err))) => {
                        warn!("websocket read error: {err}");
                        break;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        warn!("websocket idle timeout elapsed");
                        break;
                    }
                };
                match frame {
                    WsMessage::Text(text) => match JsonRpcMessage::decode(text.as_bytes()) {
                        Ok(message) => handler.handle(message).await,
                        Err(err) => warn!("dropping malformed websocket frame: {err}"),
                    },
                    WsMessage::Close(_) => break,
                    _ => {}
                }
            }
            debug!("websocket reader exiting");
            terminated.notify_waiters();
        });

        let writer_task = tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let encoded = match message.encode() {
                    Ok(s) => s,
                    Err(err) => {
                        warn!("failed to encode outbound frame: {err}");
                        continue;
                    }
                };
                if sink.send(WsMessage::Text(encoded)).await.is_err() {
                    warn!("websocket write error, stopping writer task");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        *self.tasks.lock().await = vec![reader_task, writer_task];
        Ok(())
    }

    async fn send(&self, message: JsonRpcMessage) -> AcpResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AcpError::InvalidState("transport is closed".into()));
        }
        self.outbound_tx
            .send(message)
            .map_err(|_| AcpError::Transport("writer task has exited".into()))
    }

    async fn close_gracefully(&self) -> AcpResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        self.terminated.notify_waiters();
        Ok(())
    }

    async fn await_termination(&self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        self.terminated.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = WebSocketTransportConfig::default();
        assert_eq!(config.path, "/acp");
        assert_eq!(config.idle_timeout, Duration::from_secs(30 * 60));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }
}
