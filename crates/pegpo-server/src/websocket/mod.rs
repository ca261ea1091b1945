//! WebSocket chat endpoint
//!
//! Each inbound text frame runs one full relay cycle; events go back as JSON
//! messages on the same connection.

pub mod connection;
pub mod protocol;

use std::sync::Arc;

use axum::{
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
};

use crate::state::AppState;

pub use connection::handle_socket;
pub use protocol::SocketMessage;

/// `GET /ws/chat/`
pub async fn handler(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}
