//! Handler registry: the two method-name-keyed maps a [`Session`](crate::session::Session)
//! dispatches inbound requests and notifications through.
//!
//! The two handler traits take opaque `Value` in and produce `Value`/`()`
//! out, so the registry itself never needs to know concrete request/response
//! types. Registrations are frozen into a plain `HashMap` at `Session`
//! construction time and never mutated afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AcpError;

/// Handles one inbound JSON-RPC request method, producing a result value or
/// a typed failure. A [`AcpError::Protocol`] failure is forwarded to the
/// wire with its code intact; anything else collapses to `INTERNAL_ERROR`.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, params: Option<Value>) -> Result<Value, AcpError>;
}

#[async_trait]
impl<F, Fut> RequestHandler for F
where
    F: Fn(Option<Value>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Value, AcpError>> + Send,
{
    async fn handle(&self, params: Option<Value>) -> Result<Value, AcpError> {
        (self)(params).await
    }
}

/// Handles one inbound JSON-RPC notification method. No reply is possible;
/// a failure is logged by the dispatcher, not forwarded anywhere.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, params: Option<Value>);
}

#[async_trait]
impl<F, Fut> NotificationHandler for F
where
    F: Fn(Option<Value>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send,
{
    async fn handle(&self, params: Option<Value>) {
        (self)(params).await
    }
}

/// The immutable set of handlers a peer facade registers at build time.
#[derive(Default)]
pub struct HandlerRegistry {
    requests: HashMap<String, Arc<dyn RequestHandler>>,
    notifications: HashMap<String, Arc<dyn NotificationHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn request_handler(&self, method: &str) -> Option<Arc<dyn RequestHandler>> {
        self.requests.get(method).cloned()
    }

    pub fn notification_handler(&self, method: &str) -> Option<Arc<dyn NotificationHandler>> {
        self.notifications.get(method).cloned()
    }
}

/// Accumulates handler registrations before a `Session` is built. Consumed
/// by `HandlerRegistryBuilder::build()` into a frozen [`HandlerRegistry`].
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    requests: HashMap<String, Arc<dyn RequestHandler>>,
    notifications: HashMap<String, Arc<dyn NotificationHandler>>,
}

impl HandlerRegistryBuilder {
    pub fn on_request(mut self, method: impl Into<String>, handler: Arc<dyn RequestHandler>) -> Self {
        self.requests.insert(method.into(), handler);
        self
    }

    pub fn on_notification(
        mut self,
        method: impl Into<String>,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        self.notifications.insert(method.into(), handler);
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            requests: self.requests,
            notifications: self.notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn registered_request_handler_is_invoked() {
        let registry = HandlerRegistry::builder()
            .on_request(
                "echo",
                Arc::new(|params: Option<Value>| async move {
                    Ok::<Value, AcpError>(params.unwrap_or(Value::Null))
                }),
            )
            .build();

        let handler = registry.request_handler("echo").unwrap();
        let result = handler.handle(Some(json!({"a": 1}))).await.unwrap();
        assert_eq!(result, json!({"a": 1}));
    }

    #[test]
    fn unregistered_method_returns_none() {
        let registry = HandlerRegistry::builder().build();
        assert!(registry.request_handler("nonexistent").is_none());
        assert!(registry.notification_handler("nonexistent").is_none());
    }
}
