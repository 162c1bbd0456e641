//! Capability records exchanged at `initialize` and `session/new`.
//!
//! The core never interprets these beyond exposing them to the application;
//! unknown fields are preserved via `#[serde(flatten)]` into `extra` so a
//! peer running an older copy of this crate doesn't drop fields a newer
//! peer sent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether the client can serve `fs/read_text_file` / `fs/write_text_file`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemCapability {
    #[serde(default)]
    pub read_text_file: bool,
    #[serde(default)]
    pub write_text_file: bool,
}

/// Capabilities the client advertises in its `initialize` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs: Option<FileSystemCapability>,
    #[serde(default)]
    pub terminal: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Capabilities the agent advertises back in its `initialize` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    #[serde(default)]
    pub load_session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_capabilities: Option<McpCapabilities>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Which MCP server transports an agent can bridge to on the client's
/// behalf while running a session (propagated verbatim, never interpreted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpCapabilities {
    #[serde(default)]
    pub http: bool,
    #[serde(default)]
    pub sse: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agent_capabilities_round_trip_with_unknown_fields_preserved() {
        let value = json!({"loadSession": true, "somethingNew": 42});
        let caps: AgentCapabilities = serde_json::from_value(value.clone()).unwrap();
        assert!(caps.load_session);
        assert_eq!(caps.extra.get("somethingNew"), Some(&json!(42)));

        let back = serde_json::to_value(&caps).unwrap();
        assert_eq!(back["loadSession"], json!(true));
        assert_eq!(back["somethingNew"], json!(42));
    }

    #[test]
    fn client_capabilities_default_has_no_fs_and_no_terminal() {
        let caps = ClientCapabilities::default();
        assert!(caps.fs.is_none());
        assert!(!caps.terminal);
    }
}
