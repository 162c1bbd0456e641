//! Line-framed stdio transport.
//!
//! Each JSON message occupies exactly one line, terminated by `\n`; embedded
//! newlines inside string values are escaped by `serde_json` automatically.
//! Reading and writing run on separate background tasks so a slow handler
//! never blocks the reader.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, warn};

use crate::error::{AcpError, AcpResult};
use crate::message::JsonRpcMessage;
use crate::transport::{IncomingHandler, Transport};

/// Tunables for [`StdioTransport`].
#[derive(Debug, Clone)]
pub struct StdioTransportConfig {
    /// Capacity hint for the line buffer; stdio lines are rarely this long,
    /// it just avoids early reallocation.
    pub read_buffer_capacity: usize,
}

impl Default for StdioTransportConfig {
    fn default() -> Self {
        Self {
            read_buffer_capacity: 8 * 1024,
        }
    }
}

/// A [`Transport`] over any duplex byte stream, framed one JSON object per
/// line. Constructed directly from `tokio::io::stdin()`/`stdout()` in
/// production, or from any `AsyncRead`/`AsyncWrite` pair in tests.
pub struct StdioTransport {
    outbound_tx: mpsc::UnboundedSender<JsonRpcMessage>,
    outbound_rx: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    reader: tokio::sync::Mutex<Option<Box<dyn tokio::io::AsyncRead + Send + Unpin>>>,
    writer: tokio::sync::Mutex<Option<Box<dyn tokio::io::AsyncWrite + Send + Unpin>>>,
    config: StdioTransportConfig,
    started: AtomicBool,
    closed: AtomicBool,
    terminated: Arc<Notify>,
    tasks: tokio::sync::Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl StdioTransport {
    /// Build a transport over process stdin/stdout.
    pub fn from_stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout(), StdioTransportConfig::default())
    }

    /// Build a transport over an arbitrary duplex pair (used by tests and
    /// by callers who supply a substitute for process stdio).
    pub fn new(
        reader: impl tokio::io::AsyncRead + Send + Unpin + 'static,
        writer: impl tokio::io::AsyncWrite + Send + Unpin + 'static,
        config: StdioTransportConfig,
    ) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            outbound_tx,
            outbound_rx: tokio::sync::Mutex::new(Some(outbound_rx)),
            reader: tokio::sync::Mutex::new(Some(Box::new(reader))),
            writer: tokio::sync::Mutex::new(Some(Box::new(writer))),
            config,
            started: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            terminated: Arc::new(Notify::new()),
            tasks: tokio::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn start(&self, handler: Arc<dyn IncomingHandler>) -> AcpResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AcpError::InvalidState("transport already started".into()));
        }

        let reader = self
            .reader
            .lock()
            .await
            .take()
            .ok_or_else(|| AcpError::InvalidState("transport already started".into()))?;
        let writer = self
            .writer
            .lock()
            .await
            .take()
            .ok_or_else(|| AcpError::InvalidState("transport already started".into()))?;
        let mut outbound_rx = self
            .outbound_rx
            .lock()
            .await
            .take()
            .ok_or_else(|| AcpError::InvalidState("transport already started".into()))?;

        let terminated = Arc::clone(&self.terminated);
        let capacity = self.config.read_buffer_capacity;

        let reader_task = tokio::spawn(async move {
            let mut lines = BufReader::with_capacity(capacity, reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match JsonRpcMessage::decode(line.as_bytes()) {
                            Ok(message) => handler.handle(message).await,
                            Err(err) => warn!("dropping malformed stdio frame: {err}"),
                        }
                    }
                    Ok(None) => break,
                    Err(err) => {
                        warn!("stdio read error: {err}");
                        break;
                    }
                }
            }
            debug!("stdio reader exiting");
            terminated.notify_waiters();
        });

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(message) = outbound_rx.recv().await {
                let encoded = match message.encode() {
                    Ok(s) => s,
                    Err(err) => {
                        warn!("failed to encode outbound frame: {err}");
                        continue;
                    }
                };
                if writer.write_all(encoded.as_bytes()).await.is_err()
                    || writer.write_all(b"\n").await.is_err()
                    || writer.flush().await.is_err()
                {
                    warn!("stdio write error, stopping writer task");
                    break;
                }
            }
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
