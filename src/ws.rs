//! WebSocket endpoint for turtle connections
//!
//! This module owns the socket plumbing: it accepts the upgrade, spawns a
//! writer task fed by the session's outbound queue, and runs the inbound read
//! loop. Frame interpretation lives in `session::handler`; one slow or stalled
//! turtle never delays any other connection.

use crate::session::{SessionHandle, TurtleSession};
use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// WebSocket upgrade handler for `/ws`
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

// Run one turtle connection to completion
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound queue drained by a dedicated writer task, so command dispatch
    // and registration replies never block on the peer
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = SessionHandle::new(tx);
    let conn_id = handle.conn_id;

    info!(conn_id = %conn_id, "Turtle connected");

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Failed to encode outbound frame");
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(text)).await {
                error!(error = %e, "Failed to send frame, closing writer");
                break;
            }
        }
    });

    let mut session = TurtleSession::new(state.world.clone(), state.registry.clone(), handle);

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => session.handle_text(&text).await,
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Turtle sent close frame");
                break;
            }
            Ok(Message::Binary(_)) => {
                warn!(conn_id = %conn_id, "Ignoring binary frame");
            }
            Ok(_) => {
                // Ping/pong handled by axum
            }
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // In-flight store writes have already completed; only the live handle
    // needs tearing down
    session.close().await;
    send_task.abort();

    info!(conn_id = %conn_id, "Turtle connection closed");
}
