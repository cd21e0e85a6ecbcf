//! RPC router — dispatches JSON-RPC method calls to handlers
//!
//! Each RPC method (consensus.submit, consensus.status, ...) is handled by a
//! dedicated async function. The router maps method names to handlers.

use omega_core::{Error, EventMessage, RpcResponse};
use omega_gate::{ConsensusGate, GateEvent};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Connection context passed to RPC handlers.
#[derive(Clone)]
pub struct ConnectionContext {
    pub gate: Arc<ConsensusGate>,
    pub started_at: Instant,
}

/// Result type for RPC handlers.
pub type RpcResult = omega_core::Result<Value>;

/// Route an RPC method call to the appropriate handler.
pub async fn route_rpc(method: &str, params: Value, ctx: &ConnectionContext) -> RpcResult {
    match method {
        "consensus.submit" => handle_submit(params, ctx).await,
        "consensus.status" => handle_status(ctx).await,
        "consensus.dissent" => handle_dissent(ctx).await,
        "health" => handle_health(ctx).await,
        "echo" => Ok(params),
        _ => Err(Error::MethodNotFound(method.to_string())),
    }
}

/// Convert an RPC result to an RpcResponse.
pub fn to_response(id: &str, result: RpcResult) -> RpcResponse {
    match result {
        Ok(value) => RpcResponse::ok(id, value),
        Err(Error::MethodNotFound(method)) => RpcResponse::method_not_found(id, &method),
        Err(e) => RpcResponse::err(id, e.rpc_code(), e.to_string()),
    }
}

/// Map a gate event onto the wire event format.
pub fn gate_event_to_message(event: &GateEvent) -> EventMessage {
    match event {
        GateEvent::Decided(decision) => EventMessage::decision(decision),
        GateEvent::DriftUpdated(params) => EventMessage::drift(params),
        GateEvent::DissentArchived(record) => EventMessage::dissent(record),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> RpcResult {
    Ok(serde_json::to_value(value)?)
}

/// consensus.submit — params: { "content": <any> }
async fn handle_submit(params: Value, ctx: &ConnectionContext) -> RpcResult {
    let content = match params {
        Value::Object(mut map) => map.remove("content").unwrap_or(Value::Null),
        _ => {
            return Err(Error::InvalidParams(
                "params must be an object: { \"content\": ... }".to_string(),
            ))
        }
    };
    let decision = ctx.gate.submit(content)?;
    to_json(&decision)
}

async fn handle_status(ctx: &ConnectionContext) -> RpcResult {
    let status = ctx.gate.status()?;
    to_json(&status)
}

async fn handle_dissent(ctx: &ConnectionContext) -> RpcResult {
    let ledger = ctx.gate.dissent_ledger()?;
    to_json(&ledger)
}

async fn handle_health(ctx: &ConnectionContext) -> RpcResult {
    health_snapshot(ctx)
}

/// Shared by the RPC `health` method and `GET /health`.
pub fn health_snapshot(ctx: &ConnectionContext) -> RpcResult {
    let status = ctx.gate.status()?;
    let witnesses = ctx.gate.witnesses()?;
    Ok(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": ctx.started_at.elapsed().as_secs(),
        "mode": status.mode,
        "drift_level": status.drift.drift_level,
        "dissent_count": status.dissent_count,
        "witnesses": witnesses,
    }))
}
