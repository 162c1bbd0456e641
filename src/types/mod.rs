//! Typed shapes for the method catalog.
//!
//! The session/transport layers never look inside these: to them, params
//! and results are opaque [`serde_json::Value`]s decoded lazily via
//! [`crate::message::unmarshal`]. These types exist one layer up, for the
//! peer facades in [`crate::peer`] to offer a typed API instead of raw JSON.
//! One module per message family, plain structs tagged
//! `#[serde(rename_all = "camelCase")]`.

mod capabilities;
mod content;
mod fs;
mod initialize;
mod permission;
mod session;
mod terminal;
mod update;

pub use capabilities::{AgentCapabilities, ClientCapabilities, FileSystemCapability, McpCapabilities};
pub use content::ContentBlock;
pub use fs::{ReadTextFileRequest, ReadTextFileResponse, WriteTextFileRequest, WriteTextFileResponse};
pub use initialize::{AuthMethod, AuthenticateRequest, AuthenticateResponse, InitializeRequest, InitializeResponse};
pub use permission::{
    PermissionOption, PermissionOptionKind, PermissionOutcome, RequestPermissionRequest,
    RequestPermissionResponse,
};
pub use session::{
    CancelNotification, LoadSessionRequest, LoadSessionResponse, McpServerConfig, NewSessionRequest,
    NewSessionResponse, PromptRequest, PromptResponse, SetSessionModeRequest, SetSessionModeResponse,
    SetSessionModelRequest, SetSessionModelResponse, StopReason,
};
pub use terminal::{
    EnvVariable, TerminalCreateRequest, TerminalCreateResponse, TerminalExitStatus, TerminalKillRequest,
    TerminalKillResponse, TerminalOutputRequest, TerminalOutputResponse, TerminalReleaseRequest,
    TerminalReleaseResponse, TerminalWaitForExitRequest, TerminalWaitForExitResponse,
};
pub use update::{SessionNotification, SessionUpdate};

/// The protocol version negotiated at `initialize`: a small non-negative
/// integer, opaque to the session layer beyond the negotiation rule that
/// the smaller of client-advertised and agent-supported is effective.
pub type ProtocolVersion = i64;

/// The latest protocol version this crate advertises by default.
pub const LATEST_PROTOCOL_VERSION: ProtocolVersion = 1;

/// Negotiate the effective protocol version: the smaller of the two.
pub fn negotiate_protocol_version(client: ProtocolVersion, agent: ProtocolVersion) -> ProtocolVersion {
    client.min(agent)
}
