//! # Event Stream Handler
//!
//! WebSocket endpoint that forwards every published [`ChangeEvent`] to
//! connected observers as JSON text frames. Observers only listen; any
//! inbound close or error tears the connection down. A client that
//! cannot keep up loses the events it lagged past and stays connected.
//!
//! [`ChangeEvent`]: campusbook_core::models::event::ChangeEvent

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::ApiState;

#[axum::debug_handler]
pub async fn subscribe_events(
    State(state): State<Arc<ApiState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| forward_events(socket, state))
}

async fn forward_events(socket: WebSocket, state: Arc<ApiState>) {
    let mut events = state.notifier.subscribe();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        let frame = match serde_json::to_string(&event) {
                            Ok(frame) => frame,
                            Err(error) => {
                                tracing::warn!("Failed to serialize {} event: {}", event.name(), error);
                                continue;
                            }
                        };
                        if sink.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Event observer lagged, dropped {} events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            message = stream.next() => {
                match message {
                    // Ping/pong is handled underneath; other frames are ignored
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }
}
