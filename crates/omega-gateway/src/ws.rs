//! WebSocket connection handling
//!
//! Answers JSON-RPC requests and streams gate events to every connected
//! client via a broadcast subscription.

use crate::rpc::{self, gate_event_to_message, ConnectionContext};
use crate::server::AppState;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::{SinkExt, StreamExt};
use omega_core::{EventMessage, RpcRequest};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Handle one WebSocket connection until either side closes it.
pub async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Subscribe before anything else so no event is missed
    let mut events = state.ctx.gate.subscribe();

    let info_event = EventMessage::info(env!("CARGO_PKG_VERSION"));
    if let Ok(json) = serde_json::to_string(&info_event) {
        let _ = ws_tx.send(WsMessage::Text(json)).await;
    }

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Some(response_json) = handle_text_message(&text, &state.ctx).await {
                            if ws_tx.send(WsMessage::Text(response_json)).await.is_err() {
                                return; // Client disconnected
                            }
                        }
                    }
                    Some(Ok(WsMessage::Ping(_))) => {
                        if let Ok(json) = serde_json::to_string(&EventMessage::pong()) {
                            let _ = ws_tx.send(WsMessage::Text(json)).await;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        info!("Client disconnected");
                        return;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        return;
                    }
                    None => return,
                    _ => {} // Binary, Pong
                }
            }

            event = events.recv() => {
                match event {
                    Ok(gate_event) => {
                        let event_msg = gate_event_to_message(&gate_event);
                        if let Ok(json) = serde_json::to_string(&event_msg) {
                            if ws_tx.send(WsMessage::Text(json)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client lagged, dropped {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Gate event channel closed");
                        return;
                    }
                }
            }
        }
    }
}

/// Handle a text frame. Returns the JSON reply, if any.
async fn handle_text_message(text: &str, ctx: &ConnectionContext) -> Option<String> {
    match serde_json::from_str::<RpcRequest>(text) {
        Ok(req) => {
            let result = rpc::route_rpc(&req.method, req.params, ctx).await;
            let resp = rpc::to_response(&req.id, result);
            serde_json::to_string(&resp).ok()
        }
        Err(e) => {
            let preview: String = text.chars().take(100).collect();
            warn!("Unparseable message ({}): {}", e, preview);
            None
        }
    }
}
