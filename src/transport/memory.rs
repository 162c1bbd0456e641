//! In-memory paired transport, used only by tests.
//!
//! [`memory_pair`] returns two transports, A and B, wired by two unbounded
//! queues: writes on A appear in order on B and vice-versa; closing either
//! side terminates both. This is the harness the end-to-end integration
//! tests run against.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::error::{AcpError, AcpResult};
use crate::message::JsonRpcMessage;
use crate::transport::{IncomingHandler, Transport};

/// One end of an in-memory transport pair.
///
/// `outbound` is held in an `Option` so `close_gracefully` can drop the
/// sender: that closes the channel on the peer's receiving end, which ends
/// the peer's read loop and fires *its* termination notify too, giving the
/// "close on either triggers termination on both" guarantee without a direct
/// reference to the peer.
pub struct MemoryTransport {
    outbound: tokio::sync::Mutex<Option<mpsc::UnboundedSender<JsonRpcMessage>>>,
    inbound: tokio::sync::Mutex<Option<mpsc::UnboundedReceiver<JsonRpcMessage>>>,
    started: AtomicBool,
    closed: AtomicBool,
    terminated: Arc<Notify>,
    reader_task: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

/// Build a connected pair of in-memory transports (`a`, `b`): whatever `a`
/// sends, `b` receives, and vice-versa.
pub fn memory_pair() -> (Arc<MemoryTransport>, Arc<MemoryTransport>) {
    let (a_to_b_tx, a_to_b_rx) = mpsc::unbounded_channel();
    let (b_to_a_tx, b_to_a_rx) = mpsc::unbounded_channel();

    let a = Arc::new(MemoryTransport {
        outbound: tokio::sync::Mutex::new(Some(a_to_b_tx)),
        inbound: tokio::sync::Mutex::new(Some(b_to_a_rx)),
        started: AtomicBool::new(false),
        closed: AtomicBool::new(false),
        terminated: Arc::new(Notify::new()),
        reader_task: tokio::sync::Mutex::new(None),
    });

    let b = Arc::new(MemoryTransport {
        outbound: tokio::sync::Mutex::new(Some(b_to_a_tx)),
        inbound: tokio::sync::Mutex::new(Some(a_to_b_rx)),
        started: AtomicBool::new(false),
        closed: AtomicBool::new(false),
        terminated: Arc::new(Notify::new()),
        reader_task: tokio::sync::Mutex::new(None),
    });

    (a, b)
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn start(&self, handler: Arc<dyn IncomingHandler>) -> AcpResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(AcpError::InvalidState("transport already started".into()));
        }

        let mut receiver = self
            .inbound
            .lock()
            .await
            .take()
            .ok_or_else(|| AcpError::InvalidState("transport already started".into()))?;
        let terminated = Arc::clone(&self.terminated);

        let task = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                handler.handle(message).await;
            }
            terminated.notify_waiters();
        });

        *self.reader_task.lock().await = Some(task);
        Ok(())
    }

    async fn send(&self, message: JsonRpcMessage) -> AcpResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AcpError::InvalidState("transport is closed".into()));
        }
        let guard = self.outbound.lock().await;
        match guard.as_ref() {
            Some(sender) => sender
                .send(message)
                .map_err(|_| AcpError::Transport("peer end dropped".into())),
            None => Err(AcpError::InvalidState("transport is closed".into())),
        }
    }

    async fn close_gracefully(&self) -> AcpResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        // Drop our sender so the peer's receive loop ends and its own
        // termination notify fires too.
        self.outbound.lock().await.take();
        if let Some(task) = self.reader_task.lock().await.take() {
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
