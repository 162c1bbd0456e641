//! Transport abstraction: deliver whole JSON-RPC frames in order and signal
//! connection lifecycle. See the variants in [`stdio`], [`websocket`], and
//! [`memory`].
//!
//! `Transport` is object-safe on purpose, so a `Session` can hold
//! `Arc<dyn Transport>` and never needs to be generic over its transport.
//! That costs nothing here because every transport already reports failures
//! through the single crate-wide [`AcpError`].

pub mod memory;
pub mod stdio;
pub mod websocket;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AcpResult;
use crate::message::JsonRpcMessage;

/// Callback invoked for every inbound decoded message.
///
/// `start()` takes an `Arc` rather than a plain reference so the same
/// handler can be shared between the transport's background reader task and
/// whatever installed it.
#[async_trait]
pub trait IncomingHandler: Send + Sync {
    async fn handle(&self, message: JsonRpcMessage);
}

#[async_trait]
impl<F> IncomingHandler for F
where
    F: Fn(JsonRpcMessage) + Send + Sync,
{
    async fn handle(&self, message: JsonRpcMessage) {
        (self)(message)
    }
}

/// A pluggable duplex channel for whole JSON-RPC frames.
///
/// Implementations own their background worker tasks (reader, writer) and
/// must spawn them on the shared tokio runtime rather than raw OS threads,
/// so that `close_gracefully` tearing them down is sufficient to let the
/// process exit, with no separate "daemon" flag to manage.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Install the callback invoked for every inbound message and start the
    /// background reader/writer workers. Calling this twice must fail.
    async fn start(&self, handler: Arc<dyn IncomingHandler>) -> AcpResult<()>;

    /// Enqueue a frame for sending. Returns once the frame is queued, not
    /// once it has actually reached the peer. Safe to call concurrently
    /// from multiple tasks.
    async fn send(&self, message: JsonRpcMessage) -> AcpResult<()>;

    /// Stop accepting new sends, flush what's queued, complete the inbound
    /// stream, and release every worker task. Idempotent.
    async fn close_gracefully(&self) -> AcpResult<()>;

    /// Resolves once the peer has disconnected or the transport has closed.
    async fn await_termination(&self);
}
