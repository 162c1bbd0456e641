//! The protocol engine: outbound `sendRequest`/`sendNotification`, inbound
//! dispatch, correlation, timeouts, error mapping, and the
//! `NEW -> RUNNING -> CLOSING -> CLOSED` lifecycle.
//!
//! The outbound call shape wraps a typed request around `Session::send_request`;
//! the pending-call table (see [`pending`]) correlates replies by id. Unlike a
//! client that only ever sends requests, this engine is peer-symmetric: the
//! same `Session` both awaits replies to its own outbound requests and
//! dispatches inbound requests to registered handlers.

pub mod handlers;
pub mod pending;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, warn};

use crate::error::AcpError;
use crate::message::{JsonRpcMessage, Notification, Request, RequestId, Response};
use crate::transport::{IncomingHandler, Transport};

pub use handlers::{HandlerRegistry, HandlerRegistryBuilder, NotificationHandler, RequestHandler};
pub use pending::{PendingConfig, PendingTable};

/// `NEW -> RUNNING -> CLOSING -> CLOSED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    New,
    Running,
    Closing,
    Closed,
}

/// Aggregates the session-wide tunables: the default per-request timeout
/// and the pending-call table's own configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub default_timeout: Duration,
    pub pending: PendingConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            pending: PendingConfig::default(),
        }
    }
}

/// The peer-symmetric protocol engine bound to exactly one [`Transport`].
///
/// Constructed through [`SessionBuilder`], which registers handlers and
/// populates the late-bound self reference before the transport is started,
/// so no inbound message can be dispatched against a partially-built
/// `Session`.
pub struct Session {
    transport: Arc<dyn Transport>,
    pending: Arc<PendingTable>,
    handlers: Arc<HandlerRegistry>,
    state: RwLock<SessionState>,
    default_timeout: Duration,
    self_ref: OnceCell<std::sync::Weak<Session>>,
}

impl Session {
    /// A handle to this session for use inside handlers that need to call
    /// back in (e.g. an agent's prompt handler issuing `fs/read_text_file`).
    /// Populated before `start()` runs; panics if called during
    /// construction, which no application code can observe.
    pub fn handle(&self) -> Arc<Session> {
        self.self_ref
            .get()
            .expect("Session self-reference not yet populated")
            .upgrade()
            .expect("Session dropped while still in use")
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Send a request and await its correlated reply.
    ///
    /// Returns the decoded opaque result `Value` on success. Fails with
    /// [`AcpError::Cancelled`] if the session is not `RUNNING`, or with
    /// [`AcpError::Timeout`] if `deadline` elapses first.
    pub async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
        deadline: Option<Duration>,
    ) -> Result<Value, AcpError> {
        if *self.state.read().await != SessionState::Running {
            return Err(AcpError::Cancelled);
        }

        let (id, receiver) = self.pending.register(deadline)?;
        let request = Request::new(method, params, id.clone());

        if let Err(err) = self.transport.send(JsonRpcMessage::Request(request)).await {
            self.pending.forget(&id);
            return Err(err);
        }

        let wait_for = deadline.unwrap_or(self.default_timeout);
        match tokio::time::timeout(wait_for, receiver).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(AcpError::Cancelled),
            Err(_) => {
                self.pending.forget(&id);
                Err(AcpError::Timeout(id))
            }
        }
    }

    /// Send a fire-and-forget notification. Returns once the frame is
    /// queued by the transport.
    pub async fn send_notification(&self, method: &str, params: Option<Value>) -> Result<(), AcpError> {
        if *self.state.read().await != SessionState::Running {
            return Err(AcpError::Cancelled);
        }
        let notification = Notification::new(method, params);
        self.transport
            .send(JsonRpcMessage::Notification(notification))
            .await
    }

    /// Transition to `CLOSING`, fail every pending call, stop the
    /// transport's workers, and transition to `CLOSED`. Idempotent.
    pub async fn close_gracefully(&self) -> Result<(), AcpError> {
        {
            let mut state = self.state.write().await;
            if matches!(*state, SessionState::Closing | SessionState::Closed) {
                return Ok(());
            }
            *state = SessionState::Closing;
        }
        debug!("session closing");
        self.pending.cancel_all();
        self.pending.shutdown().await;
        self.transport.close_gracefully().await?;
        *self.state.write().await = SessionState::Closed;
        debug!("session closed");
        Ok(())
    }

    async fn dispatch(&self, message: JsonRpcMessage) {
        match message {
            JsonRpcMessage::Response(response) => self.dispatch_response(response).await,
            JsonRpcMessage::Request(request) => self.dispatch_request(request).await,
            JsonRpcMessage::Notification(notification) => {
                self.dispatch_notification(notification).await
            }
        }
    }

    async fn dispatch_response(&self, response: Response) {
        let Response { id, result, error, .. } = response;
        let outcome = match error {
            Some(wire_error) => Err(AcpError::from_wire(wire_error)),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        if !self.pending.complete(&id, outcome) {
            warn!("dropping response for unknown or expired request {id}");
        }
    }

    async fn dispatch_request(&self, request: Request) {
        let Request { id, method, params, .. } = request;
        let handler = self.handlers.request_handler(&method);
        let transport = Arc::clone(&self.transport);

        tokio::spawn(async move {
            let response = match handler {
                None => Response::error(id, AcpError::method_not_found(&method).to_wire()),
                Some(handler) => match handler.handle(params).await {
                    Ok(result) => Response::success(id, result),
                    Err(err) => Response::error(id, err.to_wire()),
                },
            };
            if let Err(err) = transport.send(JsonRpcMessage::Response(response)).await {
                warn!("failed to send response for {method}: {err}");
            }
        });
    }

    async fn dispatch_notification(&self, notification: Notification) {
        let Notification { method, params, .. } = notification;
        let Some(handler) = self.handlers.notification_handler(&method) else {
            return;
        };
        tokio::spawn(async move {
            handler.handle(params).await;
        });
    }
}

struct SessionDispatcher(std::sync::Weak<Session>);

#[async_trait]
impl IncomingHandler for SessionDispatcher {
    async fn handle(&self, message: JsonRpcMessage) {
        if let Some(session) = self.0.upgrade() {
            session.dispatch(message).await;
        }
    }
}

/// Builds a [`Session`] bound to one transport: register handlers first,
/// then start the transport, so no message can arrive before the session
/// is fully assembled.
pub struct SessionBuilder {
    transport: Arc<dyn Transport>,
    handlers: HandlerRegistryBuilder,
    config: SessionConfig,
}

impl SessionBuilder {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            handlers: HandlerRegistry::builder(),
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_request(mut self, method: impl Into<String>, handler: Arc<dyn RequestHandler>) -> Self {
        self.handlers = self.handlers.on_request(method, handler);
        self
    }

    pub fn on_notification(
        mut self,
        method: impl Into<String>,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        self.handlers = self.handlers.on_notification(method, handler);
        self
    }

    /// Construct the `Session` (state `NEW`), populate its self-reference,
    /// then start the transport (transition to `RUNNING`). No inbound
    /// message is dispatchable until this call returns.
    pub async fn build(self) -> Result<Arc<Session>, AcpError> {
        let session = Arc::new(Session {
            transport: Arc::clone(&self.transport),
            pending: PendingTable::new(self.config.pending),
            handlers: Arc::new(self.handlers.build()),
            state: RwLock::new(SessionState::New),
            default_timeout: self.config.default_timeout,
            self_ref: OnceCell::new(),
        });

        session
            .self_ref
            .set(Arc::downgrade(&session))
            .map_err(|_| AcpError::Internal("self-reference already set".to_string()))?;

        let dispatcher: Arc<dyn IncomingHandler> =
            Arc::new(SessionDispatcher(Arc::downgrade(&session)));
        self.transport.start(dispatcher).await?;

        *session.state.write().await = SessionState::Running;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::memory_pair;
    use serde_json::json;

    #[tokio::test]
    async fn unregistered_method_replies_with_method_not_found() {
        let (a, b) = memory_pair();
        let agent = SessionBuilder::new(b).build().await.unwrap();
        let client = SessionBuilder::new(a).build().await.unwrap();

        let err = client.send_request("no/such/method", None, None).await.unwrap_err();
        assert!(err.is_method_not_found());

        client.close_gracefully().await.unwrap();
        agent.close_gracefully().await.unwrap();
    }

    #[tokio::test]
    async fn request_handler_result_round_trips() {
        let (a, b) = memory_pair();
        let agent = SessionBuilder::new(b)
            .on_request(
                "ping",
                Arc::new(|_params: Option<Value>| async move {
                    Ok::<Value, AcpError>(json!("pong"))
                }),
            )
            .build()
            .await
            .unwrap();
        let client = SessionBuilder::new(a).build().await.unwrap();

        let result = client.send_request("ping", None, None).await.unwrap();
        assert_eq!(result, json!("pong"));

        client.close_gracefully().await.unwrap();
        agent.close_gracefully().await.unwrap();
    }

    #[tokio::test]
    async fn typed_handler_error_preserves_code_across_the_wire() {
        let (a, b) = memory_pair();
        let agent = SessionBuilder::new(b)
            .on_request(
                "session/prompt",
                Arc::new(|_params: Option<Value>| async move {
                    Err::<Value, AcpError>(AcpError::invalid_params("Invalid prompt content"))
                }),
            )
            .build()
            .await
            .unwrap();
        let client = SessionBuilder::new(a).build().await.unwrap();

        let err = client
            .send_request("session/prompt", None, None)
            .await
            .unwrap_err();
        assert!(err.is_invalid_params());

        client.close_gracefully().await.unwrap();
        agent.close_gracefully().await.unwrap();
    }

    #[tokio::test]
    async fn notification_causes_no_reply() {
        let (a, b) = memory_pair();
        let observed = Arc::new(tokio::sync::Notify::new());
        let observed_clone = Arc::clone(&observed);
        let agent = SessionBuilder::new(b)
            .on_notification(
                "session/cancel",
                Arc::new(move |_params: Option<Value>| {
                    let observed = Arc::clone(&observed_clone);
                    async move {
                        observed.notify_waiters();
                    }
                }),
            )
            .build()
            .await
            .unwrap();
        let client = SessionBuilder::new(a).build().await.unwrap();

        client
            .send_notification("session/cancel", Some(json!({"sessionId": "s1"})))
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_millis(500), observed.notified())
            .await
            .unwrap();

        client.close_gracefully().await.unwrap();
        agent.close_gracefully().await.unwrap();
    }

    #[tokio::test]
    async fn close_gracefully_is_idempotent_and_cancels_pending_calls() {
        let (a, b) = memory_pair();
        // Agent's "slow" handler never returns within the test, simulating
        // a call still in flight when the client closes.
        let agent = SessionBuilder::new(b)
            .on_request("slow", Arc::new(|_params: Option<Value>| async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<Value, AcpError>(Value::Null)
            }))
            .build()
            .await
            .unwrap();
        let client = SessionBuilder::new(a).build().await.unwrap();

        let pending_call = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.send_request("slow", None, None).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        client.close_gracefully().await.unwrap();
        client.close_gracefully().await.unwrap();

        let result = pending_call.await.unwrap();
        assert!(matches!(result, Err(AcpError::Cancelled)));

        agent.close_gracefully().await.unwrap();
    }

    #[tokio::test]
    async fn send_request_after_close_fails_immediately() {
        let (a, b) = memory_pair();
        let agent = SessionBuilder::new(b).build().await.unwrap();
        let client = SessionBuilder::new(a).build().await.unwrap();

        client.close_gracefully().await.unwrap();
        let err = client.send_request("anything", None, None).await.unwrap_err();
        assert!(matches!(err, AcpError::Cancelled));

        agent.close_gracefully().await.unwrap();
    }
}
