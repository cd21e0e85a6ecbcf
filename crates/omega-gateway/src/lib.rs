//! Omega Gateway - HTTP and WebSocket transport for the consensus gate

pub mod rpc;
pub mod server;
pub mod ws;

pub use server::{build_router, start_gateway, AppState};
