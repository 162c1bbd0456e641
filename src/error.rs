//! Error taxonomy: the numeric JSON-RPC codes standard and ACP-specific, and
//! the single [`AcpError`] type that crosses every public API boundary in
//! this crate.
//!
//! Two shapes exist for the same information: [`AcpError`] is what the
//! in-process code throws/returns, [`WireError`] is the `{code, message,
//! data}` object that actually appears in a [`Response`](crate::message::Response).
//! `Session` converts between them without loss; in particular, a typed
//! [`AcpError::Protocol`] round-trips through the wire with its code intact.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message::RequestId;

/// Standard JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// ACP-specific error codes, all within the JSON-RPC server-error range.
pub const CONCURRENT_PROMPT: i64 = -32000;
pub const SESSION_NOT_FOUND: i64 = -32001;
pub const CAPABILITY_NOT_SUPPORTED: i64 = -32002;
pub const AUTH_REQUIRED: i64 = -32003;

/// The wire shape of a JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl WireError {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn is_method_not_found(&self) -> bool {
        self.code == METHOD_NOT_FOUND
    }

    pub fn is_invalid_params(&self) -> bool {
        self.code == INVALID_PARAMS
    }

    pub fn is_concurrent_prompt(&self) -> bool {
        self.code == CONCURRENT_PROMPT
    }

    pub fn is_session_not_found(&self) -> bool {
        self.code == SESSION_NOT_FOUND
    }

    pub fn is_capability_not_supported(&self) -> bool {
        self.code == CAPABILITY_NOT_SUPPORTED
    }

    pub fn is_auth_required(&self) -> bool {
        self.code == AUTH_REQUIRED
    }
}

/// The single error type used across transport, session, and peer APIs.
#[derive(Debug, Error, Clone)]
pub enum AcpError {
    /// A frame failed to decode at the codec level.
    #[error("parse error: {0}")]
    Parse(String),

    /// A typed protocol error, carrying the numeric code a handler chose.
    /// Preserved end-to-end across the wire, so a caller on the other side
    /// sees the same code the handler returned.
    #[error("protocol error {code}: {message}")]
    Protocol {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    /// A handler failed with something other than a typed protocol error;
    /// collapsed to `INTERNAL_ERROR` with the original message retained.
    #[error("internal error: {0}")]
    Internal(String),

    /// A `sendRequest` future did not settle before its deadline.
    #[error("request {0} timed out")]
    Timeout(RequestId),

    /// A `sendRequest` future or pending call was cancelled by a session
    /// close (graceful or transport-initiated).
    #[error("request cancelled")]
    Cancelled,

    /// The transport failed to deliver or receive a frame.
    #[error("transport error: {0}")]
    Transport(String),

    /// A Session/Transport operation was attempted in the wrong lifecycle
    /// state (e.g. `start()` called twice, `sendRequest` after `CLOSING`).
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl AcpError {
    pub fn is_method_not_found(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code == METHOD_NOT_FOUND)
    }

    pub fn is_invalid_params(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code == INVALID_PARAMS)
    }

    pub fn is_concurrent_prompt(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code == CONCURRENT_PROMPT)
    }

    pub fn is_session_not_found(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code == SESSION_NOT_FOUND)
    }

    pub fn is_capability_not_supported(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code == CAPABILITY_NOT_SUPPORTED)
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::Protocol { code, .. } if *code == AUTH_REQUIRED)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::Protocol {
            code: METHOD_NOT_FOUND,
            message: format!("method not found: {method}"),
            data: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::Protocol {
            code: INVALID_PARAMS,
            message: message.into(),
            data: None,
        }
    }

    /// Convert to the wire shape sent back in a [`Response`](crate::message::Response).
    ///
    /// Only [`AcpError::Protocol`] preserves its original code; every other
    /// variant collapses to `INTERNAL_ERROR`. `PARSE_ERROR` is reserved for
    /// codec-level frame decoding in the transport reader, which never
    /// reaches this conversion, so a handler-side failure (including a
    /// malformed params payload) always becomes either its chosen protocol
    /// code or `INTERNAL_ERROR`, never `PARSE_ERROR`.
    pub fn to_wire(&self) -> WireError {
        match self {
            Self::Protocol {
                code,
                message,
                data,
            } => WireError::new(*code, message.clone(), data.clone()),
            other => WireError::new(INTERNAL_ERROR, other.to_string(), None),
        }
    }

    /// Reconstruct an [`AcpError`] from a wire error object, preserving the
    /// numeric code so the caller can branch on it (`isInvalidParams()`, …).
    pub fn from_wire(error: WireError) -> Self {
        Self::Protocol {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

impl From<serde_json::Error> for AcpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for AcpError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type AcpResult<T> = Result<T, AcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_protocol_error_preserves_code_on_wire() {
        let err = AcpError::invalid_params("Invalid prompt content");
        let wire = err.to_wire();
        assert_eq!(wire.code, INVALID_PARAMS);
        assert_eq!(wire.message, "Invalid prompt content");
    }

    #[test]
    fn non_typed_error_collapses_to_internal_error() {
        let err = AcpError::Internal("boom".to_string());
        let wire = err.to_wire();
        assert_eq!(wire.code, INTERNAL_ERROR);
        assert_eq!(wire.message, "internal error: boom");
    }

    #[test]
    fn wire_round_trip_preserves_code() {
        let original = AcpError::Protocol {
            code: CONCURRENT_PROMPT,
            message: "already running".to_string(),
            data: None,
        };
        let wire = original.to_wire();
        let restored = AcpError::from_wire(wire);
        assert!(restored.is_concurrent_prompt());
    }

    #[test]
    fn predicates_match_expected_codes() {
        let err = AcpError::method_not_found("session/unknown");
        assert!(err.is_method_not_found());
        assert!(!err.is_invalid_params());
    }
}
