//! WebSocket connection handling
//!
//! Frames on one connection are processed strictly in order: the relay for a
//! frame runs to its terminal event before the next frame is read.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{stream, Sink, SinkExt, StreamExt};
use pegpo_core::{parse_socket_frame, RelayEvent, RelayStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::protocol::SocketMessage;
use crate::error::ChatError;
use crate::handlers::stream::relay_events;
use crate::state::AppState;

/// Serve one WebSocket connection until the client leaves
pub async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = Uuid::new_v4().to_string();
    info!("[{}] WebSocket connected", connection_id);

    let (mut sender, mut receiver) = socket.split();

    while let Some(message) = receiver.next().await {
        let frame = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            Ok(Message::Close(_)) => {
                debug!("[{}] Close frame received", connection_id);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("[{}] WebSocket error: {}", connection_id, e);
                break;
            }
        };

        debug!("[{}] Frame received ({} bytes)", connection_id, frame.len());
        let events = events_for_frame(&state, &frame);
        if let Err(e) = forward_events(&mut sender, events).await {
            debug!("[{}] Client went away mid-reply: {}", connection_id, e);
            break;
        }
    }

    info!("[{}] WebSocket disconnected", connection_id);
}

/// Relay events for one inbound frame
///
/// Invalid frames get a single in-band error and never reach the provider.
pub fn events_for_frame(state: &AppState, frame: &str) -> RelayStream {
    match parse_socket_frame(frame) {
        Ok(request) => relay_events(state.gateway.clone(), request, state.expose_error_detail()),
        Err(e) => {
            debug!("Rejected socket frame: {}", e);
            let message = ChatError::from(e).to_string();
            Box::pin(stream::iter([RelayEvent::error(message)]))
        }
    }
}

/// Write every event as one JSON text message
pub async fn forward_events<S>(sender: &mut S, mut events: RelayStream) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    while let Some(event) = events.next().await {
        let message = SocketMessage::from(event);
        match message.to_json() {
            Ok(json) => sender.send(Message::Text(json)).await?,
            Err(e) => warn!("Failed to serialize socket message: {}", e),
        }
    }
    Ok(())
}
