//! WebSocket protocol — JSON-RPC style
//!
//! Wire format:
//!
//! Client → Server (RPC request):
//!   { "id": "req-1", "method": "consensus.submit", "params": { "content": "analyze the grid" } }
//!
//! Server → Client (RPC response):
//!   { "id": "req-1", "result": { "status": "AUTHORIZED", ... } }
//!   { "id": "req-1", "error": { "code": -32601, "message": "Method not found: x" } }
//!
//! Server → Client (Event push, no id):
//!   { "event": "decision", "data": { "signal_id": "...", "status": "HELD_FOR_ARBITRATION", ... } }

use crate::types::{Decision, DissentRecord, DriftParameters};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// RPC request from client.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Server → Client: RPC response
// ---------------------------------------------------------------------------

pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// RPC response to client.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Successful response with a result value.
    pub fn ok(id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    pub fn err(id: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn method_not_found(id: impl Into<String>, method: &str) -> Self {
        Self::err(id, METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }
}

/// RPC error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Server → Client: Event push
// ---------------------------------------------------------------------------

/// Server-pushed event (no id, no request correlation).
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    pub event: String,
    pub data: serde_json::Value,
}

impl EventMessage {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// A decision was returned for a signal.
    pub fn decision(decision: &Decision) -> Self {
        Self::new("decision", to_value(decision))
    }

    /// Drift parameters changed after a deliberation.
    pub fn drift(params: &DriftParameters) -> Self {
        let mut data = to_value(params);
        if let Some(map) = data.as_object_mut() {
            map.insert("mode".to_string(), to_value(&params.mode()));
        }
        Self::new("drift", data)
    }

    /// A dissenting vote was archived.
    pub fn dissent(record: &DissentRecord) -> Self {
        Self::new("dissent", to_value(record))
    }

    /// Info event (sent on connection).
    pub fn info(version: &str) -> Self {
        Self::new("info", serde_json::json!({ "version": version }))
    }

    pub fn pong() -> Self {
        Self::new("pong", serde_json::json!({}))
    }
}

fn to_value<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
