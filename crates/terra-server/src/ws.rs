//! `WebSocket` handler for real-time state streaming.
//!
//! Clients connect to `GET /ws/state`, receive the current snapshot
//! immediately, then a JSON-encoded [`WorldSnapshot`] each time the state
//! changes. If a client falls behind, lagged snapshots are skipped and the
//! client resumes from the most recent one.
//!
//! [`WorldSnapshot`]: terra_types::WorldSnapshot

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming snapshots.
///
/// # Route
///
/// `GET /ws/state`
pub async fn ws_state(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize `value` and send it as a text frame.
///
/// Returns `false` once the client is gone.
async fn send_json<T: Serialize>(socket: &mut WebSocket, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize snapshot: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before taking the initial snapshot so no change is missed.
    let mut rx = state.subscribe();
    if !send_json(&mut socket, &state.simulation.snapshot()).await {
        debug!("WebSocket client disconnected (send failed)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(snapshot) => {
                        if !send_json(&mut socket, &snapshot).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("Snapshot channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
