//! Gateway server: REST endpoints for the gate plus the event WebSocket

use crate::rpc::{health_snapshot, ConnectionContext};
use crate::ws::handle_connection;
use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use omega_core::GatewayConfig;
use omega_gate::ConsensusGate;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state for every handler and WebSocket connection.
pub struct AppState {
    pub ctx: ConnectionContext,
}

impl AppState {
    pub fn new(gate: Arc<ConsensusGate>) -> Self {
        Self {
            ctx: ConnectionContext {
                gate,
                started_at: Instant::now(),
            },
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/consensus/signal", post(signal_handler))
        .route("/consensus/status", get(status_handler))
        .route("/consensus/dissent", get(dissent_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_gateway(config: GatewayConfig, gate: Arc<ConsensusGate>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(gate));
    let app = build_router(state);

    let bind_addr: SocketAddr = format!("{}:{}", config.bind.to_addr(), config.port).parse()?;

    info!("Omega Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  WebSocket: ws://{}/ws", bind_addr);
    info!("  Submit:    POST http://{}/consensus/signal", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Error body for gate failures. Only lock poisoning reaches here in practice.
struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0 })),
        )
            .into_response()
    }
}

impl From<omega_core::Error> for ApiError {
    fn from(e: omega_core::Error) -> Self {
        Self(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct SignalBody {
    #[serde(default)]
    content: serde_json::Value,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(health_snapshot(&state.ctx)?))
}

async fn signal_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignalBody>,
) -> Result<impl IntoResponse, ApiError> {
    let decision = state.ctx.gate.submit(body.content)?;
    Ok(Json(decision))
}

async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.ctx.gate.status()?))
}

async fn dissent_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.ctx.gate.dissent_ledger()?))
}
