//! Synchronous adapters over [`super::agent::AgentSideConnection`] and
//! [`super::client::ClientSideConnection`], for callers outside an async
//! context. Each wraps a `tokio::runtime::Handle` captured at construction
//! and drives every call through `Handle::block_on`; no additional state
//! is owned beyond the async facade itself.

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::error::AcpResult;
use crate::session::SessionConfig;
use crate::transport::Transport;
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

use super::{Agent, Client};
use super::agent::AgentSideConnection;
use super::client::ClientSideConnection;

/// Blocking wrapper around [`AgentSideConnection`]. Built on the caller's
/// current Tokio runtime handle; every method parks the calling thread
/// until the underlying async call resolves.
pub struct BlockingAgentSideConnection {
    inner: AgentSideConnection,
    handle: Handle,
}

impl BlockingAgentSideConnection {
    pub fn new(
        agent: Arc<dyn Agent>,
        transport: Arc<dyn Transport>,
        config: SessionConfig,
    ) -> AcpResult<Self> {
        let handle = Handle::current();
        let inner = handle.block_on(AgentSideConnection::new(agent, transport, config))?;
        Ok(Self { inner, handle })
    }

    pub fn read_text_file(&self, request: ReadTextFileRequest) -> AcpResult<ReadTextFileResponse> {
        self.handle.block_on(self.inner.read_text_file(request))
    }

    pub fn write_text_file(&self, request: WriteTextFileRequest) -> AcpResult<WriteTextFileResponse> {
        self.handle.block_on(self.inner.write_text_file(request))
    }

    pub fn request_permission(
        &self,
        request: RequestPermissionRequest,
    ) -> AcpResult<RequestPermissionResponse> {
        self.handle.block_on(self.inner.request_permission(request))
    }

    pub fn terminal_create(&self, request: TerminalCreateRequest) -> AcpResult<TerminalCreateResponse> {
        self.handle.block_on(self.inner.terminal_create(request))
    }

    pub fn terminal_output(&self, request: TerminalOutputRequest) -> AcpResult<TerminalOutputResponse> {
        self.handle.block_on(self.inner.terminal_output(request))
    }

    pub fn terminal_release(&self, request: TerminalReleaseRequest) -> AcpResult<TerminalReleaseResponse> {
        self.handle.block_on(self.inner.terminal_release(request))
    }

    pub fn terminal_wait_for_exit(
        &self,
        request: TerminalWaitForExitRequest,
    ) -> AcpResult<TerminalWaitForExitResponse> {
        self.handle.block_on(self.inner.terminal_wait_for_exit(request))
    }

    pub fn terminal_kill(&self, request: TerminalKillRequest) -> AcpResult<TerminalKillResponse> {
        self.handle.block_on(self.inner.terminal_kill(request))
    }

    pub fn session_update(&self, notification: SessionNotification) -> AcpResult<()> {
        self.handle.block_on(self.inner.session_update(notification))
    }

    pub fn close_gracefully(&self) -> AcpResult<()> {
        self.handle.block_on(self.inner.close_gracefully())
    }
}

/// Blocking wrapper around [`ClientSideConnection`].
pub struct BlockingClientSideConnection {
    inner: ClientSideConnection,
    handle: Handle,
}

impl BlockingClientSideConnection {
    pub fn new(
        client: Arc<dyn Client>,
        transport: Arc<dyn Transport>,
        config: SessionConfig,
    ) -> AcpResult<Self> {
        let handle = Handle::current();
        let inner = handle.block_on(ClientSideConnection::new(client, transport, config))?;
        Ok(Self { inner, handle })
    }

    pub fn initialize(&self, request: InitializeRequest) -> AcpResult<InitializeResponse> {
        self.handle.block_on(self.inner.initialize(request))
    }

    pub fn authenticate(&self, request: AuthenticateRequest) -> AcpResult<AuthenticateResponse> {
        self.handle.block_on(self.inner.authenticate(request))
    }

    pub fn new_session(&self, request: NewSessionRequest) -> AcpResult<NewSessionResponse> {
        self.handle.block_on(self.inner.new_session(request))
    }

    pub fn load_session(&self, request: LoadSessionRequest) -> AcpResult<LoadSessionResponse> {
        self.handle.block_on(self.inner.load_session(request))
    }

    pub fn prompt(&self, request: PromptRequest) -> AcpResult<PromptResponse> {
        self.handle.block_on(self.inner.prompt(request))
    }

    pub fn set_session_mode(&self, request: SetSessionModeRequest) -> AcpResult<SetSessionModeResponse> {
        self.handle.block_on(self.inner.set_session_mode(request))
    }

    pub fn set_session_model(&self, request: SetSessionModelRequest) -> AcpResult<SetSessionModelResponse> {
        self.handle.block_on(self.inner.set_session_model(request))
    }

    pub fn cancel(&self, notification: CancelNotification) -> AcpResult<()> {
        self.handle.block_on(self.inner.cancel(notification))
    }

    pub fn close_gracefully(&self) -> AcpResult<()> {
        self.handle.block_on(self.inner.close_gracefully())
    }
}
