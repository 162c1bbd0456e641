//! The client-side facade: registers a [`Client`] implementation's methods
//! as inbound handlers, and exposes typed helpers for the client→agent half
//! of the method catalog.

use std::sync::Arc;
use std::time::Duration;

use crate::error::AcpResult;
use crate::methods::agent_to_client as inbound_methods;
use crate::methods::client_to_agent as methods;
use crate::session::{Session, SessionBuilder, SessionConfig};
use crate::transport::Transport;
use crate::types::{
    AuthenticateRequest, AuthenticateResponse, CancelNotification, InitializeRequest, InitializeResponse,
    LoadSessionRequest, LoadSessionResponse, NewSessionRequest, NewSessionResponse, PromptRequest,
    PromptResponse, SetSessionModeRequest, SetSessionModeResponse, SetSessionModelRequest,
    SetSessionModelResponse,
};

use super::{decode, to_params, Client};

/// Binds one [`Client`] implementation to one [`Transport`].
///
/// Mirror image of [`super::agent::AgentSideConnection`]: outbound calls
/// (`initialize`, `session/new`, `session/prompt`, ...) go out over the
/// bound Session; inbound `fs/read_text_file`, `session/request_permission`,
/// the terminal methods, and the `session/update` notification are
/// dispatched to the `Client` trait object.
pub struct ClientSideConnection {
    session: Arc<Session>,
}

impl ClientSideConnection {
    pub async fn new(
        client: Arc<dyn Client>,
        transport: Arc<dyn Transport>,
        config: SessionConfig,
    ) -> AcpResult<Self> {
        let a = Arc::clone(&client);
        let b = Arc::clone(&client);
        let c = Arc::clone(&client);
        let d = Arc::clone(&client);
        let e = Arc::clone(&client);
        let f = Arc::clone(&client);
        let g = Arc::clone(&client);
        let h = Arc::clone(&client);

        let session = SessionBuilder::new(transport)
            .with_config(config)
            .on_request(
                inbound_methods::FS_READ_TEXT_FILE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let a = Arc::clone(&a);
                    async move {
                        let request = decode(params)?;
                        let response = a.read_text_file(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::FS_WRITE_TEXT_FILE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let b = Arc::clone(&b);
                    async move {
                        let request = decode(params)?;
                        let response = b.write_text_file(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::SESSION_REQUEST_PERMISSION,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let c = Arc::clone(&c);
                    async move {
                        let request = decode(params)?;
                        let response = c.request_permission(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::TERMINAL_CREATE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let d = Arc::clone(&d);
                    async move {
                        let request = decode(params)?;
                        let response = d.terminal_create(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::TERMINAL_OUTPUT,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let e = Arc::clone(&e);
                    async move {
                        let request = decode(params)?;
                        let response = e.terminal_output(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::TERMINAL_RELEASE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let f = Arc::clone(&f);
                    async move {
                        let request = decode(params)?;
                        let response = f.terminal_release(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::TERMINAL_WAIT_FOR_EXIT,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let g = Arc::clone(&g);
                    async move {
                        let request = decode(params)?;
                        let response = g.terminal_wait_for_exit(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_request(
                inbound_methods::TERMINAL_KILL,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let h = Arc::clone(&h);
                    async move {
                        let request = decode(params)?;
                        let response = h.terminal_kill(request).await?;
                        Ok(serde_json::to_value(response)?)
                    }
                }),
            )
            .on_notification(
                inbound_methods::SESSION_UPDATE,
                Arc::new(move |params: Option<serde_json::Value>| {
                    let client = Arc::clone(&client);
                    async move {
                        if let Ok(notification) = decode(params) {
                            client.session_update(notification).await;
                        }
                    }
                }),
            )
            .build()
            .await?;

        Ok(Self { session })
    }

    pub async fn initialize(&self, request: InitializeRequest) -> AcpResult<InitializeResponse> {
        self.call(methods::INITIALIZE, &request, None).await
    }

    pub async fn authenticate(&self, request: AuthenticateRequest) -> AcpResult<AuthenticateResponse> {
        self.call(methods::AUTHENTICATE, &request, None).await
    }

    pub async fn new_session(&self, request: NewSessionRequest) -> AcpResult<NewSessionResponse> {
        self.call(methods::SESSION_NEW, &request, None).await
    }

    pub async fn load_session(&self, request: LoadSessionRequest) -> AcpResult<LoadSessionResponse> {
        self.call(methods::SESSION_LOAD, &request, None).await
    }

    /// Sends `session/prompt` and awaits the agent's `PromptResponse`. The
    /// agent may stream any number of `session/update` notifications on the
    /// same connection while this call is outstanding; those are delivered
    /// to the bound `Client::session_update` concurrently, not buffered
    /// behind this future.
    pub async fn prompt(&self, request: PromptRequest) -> AcpResult<PromptResponse> {
        self.call(methods::SESSION_PROMPT, &request, None).await
    }

    pub async fn set_session_mode(
        &self,
        request: SetSessionModeRequest,
    ) -> AcpResult<SetSessionModeResponse> {
        self.call(methods::SESSION_SET_MODE, &request, None).await
    }

    pub async fn set_session_model(
        &self,
        request: SetSessionModelRequest,
    ) -> AcpResult<SetSessionModelResponse> {
        self.call(methods::SESSION_SET_MODEL, &request, None).await
    }

    /// `session/cancel` is a notification: returns once queued, carries no
    /// reply.
    pub async fn cancel(&self, notification: CancelNotification) -> AcpResult<()> {
        let params = to_params(&notification)?;
        self.session.send_notification(methods::SESSION_CANCEL, params).await
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
        AgentCapabilities, ContentBlock, ReadTextFileResponse, SessionNotification, SessionUpdate,
        WriteTextFileResponse,
    };
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct StubClient {
        updates: Arc<Mutex<Vec<SessionNotification>>>,
    }

    #[async_trait]
    impl Client for StubClient {
        async fn read_text_file(
            &self,
            request: crate::types::ReadTextFileRequest,
        ) -> AcpResult<ReadTextFileResponse> {
            assert_eq!(request.path, "/src/Main.java");
            Ok(ReadTextFileResponse::new("public class Main {}"))
        }

        async fn write_text_file(
            &self,
            _request: crate::types::WriteTextFileRequest,
        ) -> AcpResult<WriteTextFileResponse> {
            Ok(WriteTextFileResponse {})
        }

        async fn request_permission(
            &self,
            _request: crate::types::RequestPermissionRequest,
        ) -> AcpResult<crate::types::RequestPermissionResponse> {
            unimplemented!("not exercised by these tests")
        }

        async fn terminal_create(
            &self,
            _request: crate::types::TerminalCreateRequest,
        ) -> AcpResult<crate::types::TerminalCreateResponse> {
            unimplemented!("not exercised by these tests")
        }

        async fn terminal_output(
            &self,
            _request: crate::types::TerminalOutputRequest,
        ) -> AcpResult<crate::types::TerminalOutputResponse> {
            unimplemented!("not exercised by these tests")
        }

        async fn terminal_release(
            &self,
            _request: crate::types::TerminalReleaseRequest,
        ) -> AcpResult<crate::types::TerminalReleaseResponse> {
            unimplemented!("not exercised by these tests")
        }

        async fn terminal_wait_for_exit(
            &self,
            _request: crate::types::TerminalWaitForExitRequest,
        ) -> AcpResult<crate::types::TerminalWaitForExitResponse> {
            unimplemented!("not exercised by these tests")
        }

        async fn terminal_kill(
            &self,
            _request: crate::types::TerminalKillRequest,
        ) -> AcpResult<crate::types::TerminalKillResponse> {
            unimplemented!("not exercised by these tests")
        }

        async fn session_update(&self, notification: SessionNotification) {
            self.updates.lock().await.push(notification);
        }
    }

    #[tokio::test]
    async fn session_update_notifications_are_observed_by_the_client() {
        let (client_transport, agent_transport) = memory_pair();
        let updates = Arc::new(Mutex::new(Vec::new()));
        let client = ClientSideConnection::new(
            Arc::new(StubClient {
                updates: Arc::clone(&updates),
            }),
            client_transport,
            SessionConfig::default(),
        )
        .await
        .unwrap();

        let agent_session = SessionBuilder::new(agent_transport).build().await.unwrap();
        agent_session
            .send_notification(
                inbound_methods::SESSION_UPDATE,
                to_params(&SessionNotification::new(
                    "s1",
                    SessionUpdate::AgentThoughtChunk {
                        content: ContentBlock::text("Analyzing code..."),
                    },
                ))
                .unwrap(),
            )
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert_eq!(updates.lock().await.len(), 1);

        agent_session.close_gracefully().await.unwrap();
        client.close_gracefully().await.unwrap();
    }

    #[tokio::test]
    async fn agent_reads_a_file_through_the_client_connection() {
        let (client_transport, agent_transport) = memory_pair();
        let client = ClientSideConnection::new(
            Arc::new(StubClient {
                updates: Arc::new(Mutex::new(Vec::new())),
            }),
            client_transport,
            SessionConfig::default(),
        )
        .await
        .unwrap();

        let agent_session = SessionBuilder::new(agent_transport).build().await.unwrap();
        let response: ReadTextFileResponse = agent_session
            .send_request(
                inbound_methods::FS_READ_TEXT_FILE,
                to_params(&crate::types::ReadTextFileRequest::new("s1", "/src/Main.java")).unwrap(),
                None,
            )
            .await
            .map(|v| serde_json::from_value(v).unwrap())
            .unwrap();

        assert_eq!(response.content, "public class Main {}");

        agent_session.close_gracefully().await.unwrap();
        client.close_gracefully().await.unwrap();
    }

    #[allow(dead_code)]
    fn assert_agent_capabilities_type(_: AgentCapabilities) {}
}
