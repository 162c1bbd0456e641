//! acp-sdk - Agent Client Protocol implementation
//!
//! This crate implements the Agent Client Protocol (ACP): a JSON-RPC 2.0
//! based, bidirectional protocol between an interactive client (an editor
//! or other host) and an autonomous coding agent.
//!
//! # Architecture
//!
//! - **Message layer** (`message`): JSON-RPC 2.0 envelopes, `Request`,
//!   `Notification`, `Response`, and the content-sniffing decode that tells
//!   them apart on the wire.
//! - **Error layer** (`error`): `AcpError`, the typed taxonomy covering
//!   standard JSON-RPC codes and the ACP-specific extensions, with lossless
//!   conversion to and from the wire `WireError` shape.
//! - **Transport layer** (`transport`): the `Transport` trait and three
//!   implementations, line-framed stdio, WebSocket, and an in-memory paired
//!   transport for tests.
//! - **Session layer** (`session`): the peer-symmetric protocol engine,
//!   handling pending-call correlation, handler dispatch, and connection lifecycle.
//! - **Types layer** (`types`): typed request/response/notification shapes
//!   for every method in the catalog.
//! - **Peer layer** (`peer`): the `Agent`/`Client` role traits and the
//!   connection facades (`AgentSideConnection`, `ClientSideConnection`, and
//!   their blocking adapters) applications actually build against.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use acp_sdk::peer::{Agent, AgentSideConnection};
//! use acp_sdk::session::SessionConfig;
//! use acp_sdk::transport::stdio::StdioTransport;
//! use acp_sdk::types::{
//!     AgentCapabilities, AuthenticateRequest, AuthenticateResponse, CancelNotification,
//!     InitializeRequest, InitializeResponse, LoadSessionRequest, LoadSessionResponse,
//!     NewSessionRequest, NewSessionResponse, PromptRequest, PromptResponse,
//!     SetSessionModeRequest, SetSessionModeResponse, SetSessionModelRequest,
//!     SetSessionModelResponse, StopReason,
//! };
//! use async_trait::async_trait;
//!
//! struct MyAgent;
//!
//! #[async_trait]
//! impl Agent for MyAgent {
//!     async fn initialize(&self, request: InitializeRequest) -> acp_sdk::error::AcpResult<InitializeResponse> {
//!         Ok(InitializeResponse {
//!             protocol_version: request.protocol_version,
//!             agent_capabilities: AgentCapabilities::default(),
//!             auth_methods: Vec::new(),
//!         })
//!     }
//!     async fn authenticate(&self, _request: AuthenticateRequest) -> acp_sdk::error::AcpResult<AuthenticateResponse> {
//!         Ok(AuthenticateResponse {})
//!     }
//!     async fn new_session(&self, _request: NewSessionRequest) -> acp_sdk::error::AcpResult<NewSessionResponse> {
//!         Ok(NewSessionResponse { session_id: "s1".into() })
//!     }
//!     async fn load_session(&self, _request: LoadSessionRequest) -> acp_sdk::error::AcpResult<LoadSessionResponse> {
//!         Ok(LoadSessionResponse {})
//!     }
//!     async fn prompt(&self, _request: PromptRequest) -> acp_sdk::error::AcpResult<PromptResponse> {
//!         Ok(PromptResponse::new(StopReason::EndTurn))
//!     }
//!     async fn set_session_mode(&self, _request: SetSessionModeRequest) -> acp_sdk::error::AcpResult<SetSessionModeResponse> {
//!         Ok(SetSessionModeResponse {})
//!     }
//!     async fn set_session_model(&self, _request: SetSessionModelRequest) -> acp_sdk::error::AcpResult<SetSessionModelResponse> {
//!         Ok(SetSessionModelResponse {})
//!     }
//!     async fn cancel(&self, _notification: CancelNotification) {}
//! }
//!
//! # async fn run() -> acp_sdk::error::AcpResult<()> {
//! let transport = Arc::new(StdioTransport::from_stdio());
//! let connection = AgentSideConnection::new(Arc::new(MyAgent), transport, SessionConfig::default()).await?;
//! connection.close_gracefully().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod message;
pub mod methods;
pub mod peer;
pub mod session;
pub mod transport;
pub mod types;

pub use error::{AcpError, AcpResult, WireError};
pub use message::{JsonRpcMessage, Notification, Request, RequestId, Response};
pub use peer::{Agent, AgentSideConnection, BlockingAgentSideConnection, BlockingClientSideConnection, Client, ClientSideConnection};
pub use session::{Session, SessionBuilder, SessionConfig, SessionState};
pub use transport::Transport;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the crate version as a string.
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::transport::memory::memory_pair;
    use crate::types::{
        AgentCapabilities, AuthenticateRequest, AuthenticateResponse, CancelNotification, InitializeRequest,
        InitializeResponse, LoadSessionRequest, LoadSessionResponse, NewSessionRequest, NewSessionResponse,
        PromptRequest, PromptResponse, SetSessionModeRequest, SetSessionModeResponse, SetSessionModelRequest,
        SetSessionModelResponse, StopReason,
    };

    struct EchoAgent;

    #[async_trait]
    impl Agent for EchoAgent {
        async fn initialize(&self, request: InitializeRequest) -> AcpResult<InitializeResponse> {
            Ok(InitializeResponse {
                protocol_version: request.protocol_version,
                agent_capabilities: AgentCapabilities::default(),
                auth_methods: Vec::new(),
            })
        }

        async fn authenticate(&self, _request: AuthenticateRequest) -> AcpResult<AuthenticateResponse> {
            Ok(AuthenticateResponse {})
        }

        async fn new_session(&self, _request: NewSessionRequest) -> AcpResult<NewSessionResponse> {
            Ok(NewSessionResponse {
                session_id: "s1".to_string(),
            })
        }

        async fn load_session(&self, _request: LoadSessionRequest) -> AcpResult<LoadSessionResponse> {
            Ok(LoadSessionResponse {})
        }

        async fn prompt(&self, _request: PromptRequest) -> AcpResult<PromptResponse> {
            Ok(PromptResponse::new(StopReason::EndTurn))
        }

        async fn set_session_mode(
            &self,
            _request: SetSessionModeRequest,
        ) -> AcpResult<SetSessionModeResponse> {
            Ok(SetSessionModeResponse {})
        }

        async fn set_session_model(
            &self,
            _request: SetSessionModelRequest,
        ) -> AcpResult<SetSessionModelResponse> {
            Ok(SetSessionModelResponse {})
        }

        async fn cancel(&self, _notification: CancelNotification) {}
    }

    #[tokio::test]
    async fn public_api_wires_an_agent_connection_end_to_end() {
        let (client_transport, agent_transport) = memory_pair();
        let connection =
            AgentSideConnection::new(Arc::new(EchoAgent), agent_transport, SessionConfig::default())
                .await
                .unwrap();

        let client_session = SessionBuilder::new(client_transport).build().await.unwrap();
        let response: InitializeResponse = client_session
            .send_request(
                methods::client_to_agent::INITIALIZE,
                Some(serde_json::to_value(InitializeRequest::new(1, Default::default())).unwrap()),
                None,
            )
            .await
            .map(|v| serde_json::from_value(v).unwrap())
            .unwrap();

        assert_eq!(response.protocol_version, 1);

        client_session.close_gracefully().await.unwrap();
        connection.close_gracefully().await.unwrap();
    }

    #[test]
    fn version_is_non_empty() {
        assert!(!version().is_empty());
    }
}
