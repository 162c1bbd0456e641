//! JSON-RPC 2.0 wire message types.
//!
//! A connection exchanges three kinds of frames: [`Request`], [`Notification`]
//! and [`Response`]. All three are wrapped by [`JsonRpcMessage`] for decoding,
//! since the wire format does not tag its variant explicitly. The shape has
//! to be sniffed from which of `method`/`id`/`result`/`error` are present.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{AcpError, WireError};

/// JSON-RPC 2.0 version tag. Always serialized as the literal string `"2.0"`.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request or notification id.
///
/// The protocol accepts both string and integer ids on ingress, but this
/// crate always generates string ids for outbound requests (see
/// [`crate::session::pending::RequestIdGenerator`]). Equality is by value,
/// matching JSON-RPC's match-by-value-equality ingress rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl RequestId {
    pub fn new_number(id: i64) -> Self {
        Self::Number(id)
    }

    pub fn new_string(id: impl Into<String>) -> Self {
        Self::String(id.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A JSON-RPC request: expects exactly one correlated [`Response`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC notification: fire-and-forget, no reply expected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC response: exactly one of `result`/`error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: RequestId, error: WireError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Any of the three JSON-RPC frame kinds, as decoded off the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    Request(Request),
    Notification(Notification),
    Response(Response),
}

impl JsonRpcMessage {
    /// Encode a message to a single-line JSON string (no trailing newline).
    pub fn encode(&self) -> Result<String, AcpError> {
        let value = match self {
            Self::Request(r) => serde_json::to_string(r),
            Self::Notification(n) => serde_json::to_string(n),
            Self::Response(r) => serde_json::to_string(r),
        };
        value.map_err(AcpError::from)
    }

    /// Decode a message from raw bytes, content-sniffing the variant.
    ///
    /// Presence of `method` selects Request/Notification (split further by
    /// presence of `id`); absence of `method` with `id` present selects
    /// Response. Any other shape, or malformed JSON, is a [`AcpError::Parse`].
    pub fn decode(bytes: &[u8]) -> Result<Self, AcpError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| AcpError::Parse(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AcpError> {
        let obj = value
            .as_object()
            .ok_or_else(|| AcpError::Parse("frame is not a JSON object".to_string()))?;

        let has_method = obj.contains_key("method");
        let has_id = obj.contains_key("id");

        if has_method {
            if has_id {
                let request: Request = serde_json::from_value(value)
                    .map_err(|e| AcpError::Parse(format!("malformed request: {e}")))?;
                Ok(Self::Request(request))
            } else {
                let notification: Notification = serde_json::from_value(value)
                    .map_err(|e| AcpError::Parse(format!("malformed notification: {e}")))?;
                Ok(Self::Notification(notification))
            }
        } else if has_id {
            let response: Response = serde_json::from_value(value)
                .map_err(|e| AcpError::Parse(format!("malformed response: {e}")))?;
            Ok(Self::Response(response))
        } else {
            Err(AcpError::Parse(
                "frame has neither `method` nor `id`".to_string(),
            ))
        }
    }
}

/// Decode an opaque JSON value into a typed value on demand.
///
/// Params/result/data are kept as [`serde_json::Value`] until a caller
/// actually needs the typed shape.
pub fn unmarshal<T: for<'de> Deserialize<'de>>(value: &Value) -> Result<T, AcpError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AcpError::Parse(format!("failed to decode value: {e}")))
}
