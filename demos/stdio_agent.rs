//! Minimal stdio-hosted agent, wired the way an editor would actually spawn one.
//!
//! Reads JSON-RPC frames from stdin, writes replies to stdout, and logs to
//! stderr so the protocol stream on stdout stays clean. Run with
//! `RUST_LOG=acp_sdk=debug` to see dispatch traces.

use std::sync::Arc;

use async_trait::async_trait;

use acp_sdk::error::AcpResult;
use acp_sdk::peer::{Agent, AgentSideConnection};
use acp_sdk::session::SessionConfig;
use acp_sdk::transport::stdio::StdioTransport;
use acp_sdk::transport::Transport;
use acp_sdk::types::{
    AgentCapabilities, AuthenticateRequest, AuthenticateResponse, CancelNotification,
    InitializeRequest, InitializeResponse, LoadSessionRequest, LoadSessionResponse,
    NewSessionRequest, NewSessionResponse, PromptRequest, PromptResponse, SetSessionModeRequest,
    SetSessionModeResponse, SetSessionModelRequest, SetSessionModelResponse, StopReason,
};

/// An agent that accepts any session and immediately ends the turn, useful
/// as a wiring smoke test for a client implementation.
struct NoopAgent;

#[async_trait]
impl Agent for NoopAgent {
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
            session_id: "stdio-demo-session".into(),
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

#[tokio::main]
async fn main() -> AcpResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acp_sdk=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let transport = Arc::new(StdioTransport::from_stdio());
    let connection =
        AgentSideConnection::new(Arc::new(NoopAgent), transport.clone(), SessionConfig::default())
            .await?;

    tracing::info!("acp-stdio-agent-demo listening on stdio");
    transport.await_termination().await;
    connection.close_gracefully().await?;
    Ok(())
}
