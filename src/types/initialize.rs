//! `initialize` and `authenticate`: the handshake client facades send first.

use serde::{Deserialize, Serialize};

use super::capabilities::{AgentCapabilities, ClientCapabilities};
use super::ProtocolVersion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    pub protocol_version: ProtocolVersion,
    #[serde(default)]
    pub client_capabilities: ClientCapabilities,
}

impl InitializeRequest {
    pub fn new(protocol_version: ProtocolVersion, client_capabilities: ClientCapabilities) -> Self {
        Self {
            protocol_version,
            client_capabilities,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    pub protocol_version: ProtocolVersion,
    #[serde(default)]
    pub agent_capabilities: AgentCapabilities,
    #[serde(default)]
    pub auth_methods: Vec<AuthMethod>,
}

/// One way the client could authenticate with the agent, advertised so the
/// client can present a picker; opaque beyond id/name/description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthMethod {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub method_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticateResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileSystemCapability;
    use serde_json::json;

    #[test]
    fn initialize_request_matches_scenario_shape() {
        let request = InitializeRequest::new(
            1,
            ClientCapabilities {
                fs: Some(FileSystemCapability::default()),
                ..Default::default()
            },
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["protocolVersion"], json!(1));
    }

    #[test]
    fn initialize_response_decodes_scenario_payload() {
        let value = json!({
            "protocolVersion": 1,
            "agentCapabilities": {"loadSession": true},
            "authMethods": [],
        });
        let response: InitializeResponse = serde_json::from_value(value).unwrap();
        assert_eq!(response.protocol_version, 1);
        assert!(response.agent_capabilities.load_session);
        assert!(response.auth_methods.is_empty());
    }
}
