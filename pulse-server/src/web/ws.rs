//! Live-update WebSocket endpoint.
//!
//! Each connection registers a subscriber with the hub and gets the
//! current snapshot immediately, then a full snapshot after every poll.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::debug;

use crate::hub::{DEFAULT_QUEUE_CAPACITY, Hub, Subscriber};

use super::state::AppState;

/// Upgrade to a WebSocket carrying snapshot pushes.
pub(super) async fn live_updates(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let (subscriber, mut queue) = Subscriber::channel(DEFAULT_QUEUE_CAPACITY);
    let id = hub.subscribe(subscriber).await;

    let (mut sink, mut stream) = socket.split();

    // Queue → socket. Ends when the hub drops us or the socket write fails.
    let mut send_task = tokio::spawn(async move {
        while let Some(json) = queue.recv().await {
            if sink.send(Message::Text(json.to_string())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Clients don't send anything we act on; just watch for the close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = stream.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    hub.unsubscribe(id).await;
    debug!(subscriber = ?id, "websocket closed");
}
