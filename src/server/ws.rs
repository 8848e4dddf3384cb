//! WebSocket push endpoint

use super::AppState;
use crate::telemetry::{self, GaugeMetric};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let client_id = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.hub.subscribe();

    telemetry::adjust_gauge(GaugeMetric::ConnectedClients, 1.0);
    tracing::info!(%client_id, "Dashboard client connected");

    loop {
        tokio::select! {
            frame = updates.recv() => {
                match frame {
                    Ok(frame) => {
                        if sender.send(Message::Text(frame.to_string())).await.is_err() {
                            break;
                        }
                    }
                    // Each frame is a full replacement; the next one catches the client up.
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(%client_id, skipped, "Slow client skipped updates");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Clients only listen
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    telemetry::adjust_gauge(GaugeMetric::ConnectedClients, -1.0);
    tracing::info!(%client_id, "Dashboard client disconnected");
}
