//! Peer facades: thin typed APIs on top of [`crate::session::Session`] for
//! the client role and the agent role.
//!
//! Application code never touches [`Session`](crate::session::Session)
//! directly. Instead it implements one of the two role traits below,
//! [`Agent`] for the autonomous coding assistant, [`Client`] for the
//! interactive host, and hands it to the matching connection type. The
//! connection registers the trait's methods as Session handlers for the
//! inbound half of the catalog and exposes typed helpers for the outbound
//! half. Each side both calls out and is called into, so one facade per
//! role covers the whole protocol.

pub mod agent;
pub mod blocking;
pub mod client;

use async_trait::async_trait;

use crate::error::AcpResult;
use crate::types::{
    AuthenticateRequest, AuthenticateResponse, CancelNotification, InitializeRequest, InitializeResponse,
    LoadSessionRequest, LoadSessionResponse, NewSessionRequest, NewSessionResponse, PromptRequest,
    PromptResponse, ReadTextFileRequest, ReadTextFileResponse, RequestPermissionRequest,
    RequestPermissionResponse, SessionNotification, SetSessionModeRequest, SetSessionModeResponse,
    SetSessionModelRequest, SetSessionModelResponse, TerminalCreateRequest, TerminalCreateResponse,
    TerminalKillRequest, TerminalKillResponse, TerminalOutputRequest, TerminalOutputResponse,
    TerminalReleaseRequest, TerminalReleaseResponse, TerminalWaitForExitRequest, TerminalWaitForExitResponse,
    WriteTextFileRequest, WriteTextFileResponse,
};

/// Business logic implemented by an autonomous coding assistant. An
/// [`agent::AgentSideConnection`] dispatches every inbound client→agent
/// request to one of these methods; `cancel` is a notification and so
/// cannot fail or reply.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn initialize(&self, request: InitializeRequest) -> AcpResult<InitializeResponse>;
    async fn authenticate(&self, request: AuthenticateRequest) -> AcpResult<AuthenticateResponse>;
    async fn new_session(&self, request: NewSessionRequest) -> AcpResult<NewSessionResponse>;
    async fn load_session(&self, request: LoadSessionRequest) -> AcpResult<LoadSessionResponse>;
    async fn prompt(&self, request: PromptRequest) -> AcpResult<PromptResponse>;
    async fn set_session_mode(&self, request: SetSessionModeRequest) -> AcpResult<SetSessionModeResponse>;
    async fn set_session_model(&self, request: SetSessionModelRequest) -> AcpResult<SetSessionModelResponse>;
    async fn cancel(&self, notification: CancelNotification);
}

/// Business logic implemented by an interactive host (editor). A
/// [`client::ClientSideConnection`] dispatches every inbound agent→client
/// request to one of these methods; `session_update` is a notification.
#[async_trait]
pub trait Client: Send + Sync {
    async fn read_text_file(&self, request: ReadTextFileRequest) -> AcpResult<ReadTextFileResponse>;
    async fn write_text_file(&self, request: WriteTextFileRequest) -> AcpResult<WriteTextFileResponse>;
    async fn request_permission(
        &self,
        request: RequestPermissionRequest,
    ) -> AcpResult<RequestPermissionResponse>;
    async fn terminal_create(&self, request: TerminalCreateRequest) -> AcpResult<TerminalCreateResponse>;
    async fn terminal_output(&self, request: TerminalOutputRequest) -> AcpResult<TerminalOutputResponse>;
    async fn terminal_release(&self, request: TerminalReleaseRequest) -> AcpResult<TerminalReleaseResponse>;
    async fn terminal_wait_for_exit(
        &self,
        request: TerminalWaitForExitRequest,
    ) -> AcpResult<TerminalWaitForExitResponse>;
    async fn terminal_kill(&self, request: TerminalKillRequest) -> AcpResult<TerminalKillResponse>;
    async fn session_update(&self, notification: SessionNotification);
}

pub use agent::AgentSideConnection;
pub use blocking::{BlockingAgentSideConnection, BlockingClientSideConnection};
pub use client::ClientSideConnection;

/// Encode a typed value to the opaque wire shape, mapping serialization
/// failures to `INTERNAL_ERROR` rather than panicking. A typed request
/// struct should always serialize, but a corrupt `extra` map on a
/// capabilities type could in principle contain a non-JSON-safe `f64`.
pub(crate) fn to_params<T: serde::Serialize>(value: &T) -> AcpResult<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(value)?))
}

pub(crate) fn decode<T: for<'de> serde::Deserialize<'de>>(
    value: Option<serde_json::Value>,
) -> AcpResult<T> {
    crate::message::unmarshal(&value.unwrap_or(serde_json::Value::Null))
}
