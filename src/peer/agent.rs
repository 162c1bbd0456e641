//! The agent-side facade: registers an [`Agent`] implementation's methods as
//! inbound handlers, and exposes typed helpers for the agent→client half of
//! the method catalog.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AcpResult;
use crate::methods::agent_to_client as methods;
use crate::methods::client_to_agent as inbound_methods;
use crate::session::{Session, SessionBuilder, SessionConfig};
use crate::transport::Transport;
use crate::types::{
    ReadTextFileRequest, ReadTextFileResponse, RequestPermissionRequest, RequestPermissionResponse,
    SessionNotification, TerminalCreateRequest, TerminalCreateResponse, TerminalKillRequest,
    TerminalKillResponse, TerminalOutputRequest, TerminalOutputResponse, TerminalReleaseRequest,
    TerminalReleaseResponse, TerminalWaitForExitRequest, TerminalWaitForExitResponse,
    WriteTextFileRequest, WriteTextFileResponse,
};

use super::{decode, to_params, Agent};

/// Binds one [`Agent`] implementation to one [`Transport`].
///
/// Outbound calls (`read_text_file`, `request_permission`, the terminal
/// methods, `session_update`) go out over the bound Session; inbound
/// `initialize`/`session/new`/`session/prompt`/etc. are dispatched to the
/// `Agent` trait object. Construction builds the session, registers its
/// handlers, and only then starts the transport, so `agent` may itself
/// call back into this connection (e.g. from inside `prompt`) without
/// any partially-built state.
pub struct AgentSideConnection {
    session: Arc<Session>,
}

impl AgentSideConnection {
    /// Build the connection and start the transport. `agent` is boxed once
    /// and shared by every registered handler.
    pub async fn new(
        agent: Arc<dyn Agent>,
        transport: Arc<dyn Transport>,
        config: SessionConfig,
    ) -> AcpResult<Self> {
        let a = Arc::clone(&agent);
        let b = Arc::clone(&agent);
        let c = Arc::clone(&agent);
        let d = Arc::clone(&agent);
        let e = Arc::clone(&agent);
        let f = Arc::clone(&agent);
        let g = Arc::clone(&agent);
        let h = Arc::clone(&agent);

        let session = SessionBuilder::new(transport)
            .with_config(config)
            .on_request(
                inbound_methods::INITIALIZE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let a = Arc::clone(&a);
                    async move {
                        let request = decode(params)?;
                        let response = a.initialize(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::AUTHENTICATE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let b = Arc::clone(&b);
                    async move {
                        let request = decode(params)?;
                        let response = b.authenticate(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::SESSION_NEW,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let c = Arc::clone(&c);
                    async move {
                        let request = decode(params)?;
                        let response = c.new_session(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::SESSION_LOAD,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let d = Arc::clone(&d);
                    async move {
                        let request = decode(params)?;
                        let response = d.load_session(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::SESSION_PROMPT,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let e = Arc::clone(&e);
                    async move {
                        let request = decode(params)?;
                        let response = e.prompt(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::SESSION_SET_MODE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let f = Arc::clone(&f);
                    async move {
                        let request = decode(params)?;
                        let response = f.set_session_mode(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::SESSION_SET_MODEL,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let g = Arc::clone(&g);
                    async move {
                        let request = decode(params)?;
                        let response = g.set_session_model(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_notification(
                inbound_methods::SESSION_CANCEL,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let h = Arc::clone(&h);
                    async move {
                        if let Ok(notification) = decode(params) {
                            h.cancel(notification).await;
                        }
                    }
                }),
            )
            .build()
            .await?;

        Ok(Self { session })
    }

    /// The default timeout new outbound calls use unless overridden.
    pub async fn read_text_file(&self, request: ReadTextFileRequest) -> AcpResult<ReadTextFileResponse> {
        self.call(methods::FS_READ_TEXT_FILE, &request, None).await
    }

    pub async fn write_text_file(&self, request: WriteTextFileRequest) -> AcpResult<WriteTextFileResponse> {
        self.call(methods::FS_WRITE_TEXT_FILE, &request, None).await
    }

    pub async fn request_permission(
        &self,
        request: RequestPermissionRequest,
    ) -> AcpResult<RequestPermissionResponse> {
        self.call(methods::SESSION_REQUEST_PERMISSION, &request, None).await
    }

    pub async fn terminal_create(&self, request: TerminalCreateRequest) -> AcpResult<TerminalCreateResponse> {
        self.call(methods::TERMINAL_CREATE, &request, None).await
    }

    pub async fn terminal_output(&self, request: TerminalOutputRequest) -> AcpResult<TerminalOutputResponse> {
        self.call(methods::TERMINAL_OUTPUT, &request, None).await
    }

    pub async fn terminal_release(
        &self,
        request: TerminalReleaseRequest,
    ) -> AcpResult<TerminalReleaseResponse> {
        self.call(methods::TERMINAL_RELEASE, &request, None).await
    }

    pub async fn terminal_wait_for_exit(
        &self,
        request: TerminalWaitForExitRequest,
    ) -> AcpResult<TerminalWaitForExitResponse> {
        self.call(methods::TERMINAL_WAIT_FOR_EXIT, &request, None).await
    }

    pub async fn terminal_kill(&self, request: TerminalKillRequest) -> AcpResult<TerminalKillResponse> {
        self.call(methods::TERMINAL_KILL, &request, None).await
    }

    /// Stream a `session/update`. Fire-and-forget: returns once the
    /// notification is queued by the transport.
    pub async fn session_update(&self, notification: SessionNotification) -> AcpResult<()> {
        let params = to_params(&notification)?;
        self.session.send_notification(methods::SESSION_UPDATE, params).await
    }

    pub async fn close_gracefully(&self) -> AcpResult<()> {
        self.session.close_gracefully().await
    }

    async fn call<P: serde::Serialize, R: for<'de> serde::Deserialize<'de>>(
        &self,
        method: &str,
        params: &P,
        deadline: Option<Duration>,
    ) -> AcpResult<R> {
        let params = to_params(params)?;
        let result = self.session.send_request(method, params, deadline).await?;
        crate::message::unmarshal(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::memory_pair;
    use crate::types::{
        AgentCapabilities, AuthenticateRequest, AuthenticateResponse, CancelNotification, InitializeRequest,
        InitializeResponse, LoadSessionRequest, LoadSessionResponse, NewSessionRequest, NewSessionResponse,
        PromptRequest, PromptResponse, SetSessionModeRequest, SetSessionModeResponse, SetSessionModelRequest,
        SetSessionModelResponse, StopReason,
    };
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct StubAgent {
        cancelled: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Agent for StubAgent {
        async fn initialize(&self, request: InitializeRequest) -> AcpResult<InitializeResponse> {
            Ok(InitializeResponse {
                protocol_version: request.protocol_version,
                agent_capabilities: AgentCapabilities {
                    load_session: true,
                    ..Default::default()
                },
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

        async fn cancel(&self, notification: CancelNotification) {
            self.cancelled.lock().await.push(notification.session_id);
        }
    }

    #[tokio::test]
    async fn initialize_round_trips_through_the_agent_connection() {
        let (client_transport, agent_transport) = memory_pair();
        let agent = Arc::new(StubAgent {
            cancelled: Arc::new(Mutex::new(Vec::new())),
        });
        let connection = AgentSideConnection::new(agent, agent_transport, SessionConfig::default())
            .await
            .unwrap();

        let client_session = SessionBuilder::new(client_transport).build().await.unwrap();
        let response: InitializeResponse = client_session
            .send_request(
                inbound_methods::INITIALIZE,
                to_params(&InitializeRequest::new(1, Default::default())).unwrap(),
                None,
            )
            .await
            .map(|v| serde_json::from_value(v).unwrap())
            .unwrap();

        assert_eq!(response.protocol_version, 1);
        assert!(response.agent_capabilities.load_session);

        client_session.close_gracefully().await.unwrap();
        connection.close_gracefully().await.unwrap();
    }
}
