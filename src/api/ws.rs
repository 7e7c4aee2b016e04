//! WebSocket fan-out of board events to connected clients.

use super::handlers::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::time::{interval, Duration};
use tracing::{debug, warn};

/// Query parameters for filtering WebSocket events.
#[derive(Debug, Deserialize, Default)]
pub struct WsQuery {
    /// Comma-separated entity kinds to subscribe to (e.g. "task,epic").
    pub entities: Option<String>,
}

/// WebSocket upgrade handler for `/ws/events`.
pub async fn ws_events(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    let entity_filter: Option<HashSet<String>> = query.entities.map(|kinds| {
        kinds
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    });

    ws.on_upgrade(move |socket| handle_ws(socket, state, entity_filter))
}

fn passes_filter(
    event: &crate::events::BoardEvent,
    entity_filter: &Option<HashSet<String>>,
) -> bool {
    let Some(filter) = entity_filter else {
        return true;
    };
    let entity = serde_json::to_value(event.entity)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_default();
    filter.contains(&entity)
}

/// Handle an individual WebSocket connection.
///
/// Events are forwarded in emission order. A client that lags past the
/// broadcast capacity loses the oldest events; it is expected to resync
/// with a full refetch, never to assume gap-free delivery.
async fn handle_ws(socket: WebSocket, state: AppState, entity_filter: Option<HashSet<String>>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut event_rx = state.event_bus.subscribe();

    // Ping interval (30s); skip the first immediate tick.
    let mut ping_interval = interval(Duration::from_secs(30));
    ping_interval.tick().await;

    debug!(entity_filter = ?entity_filter, "WebSocket events client connected");

    loop {
        tokio::select! {
            result = event_rx.recv() => {
                match result {
                    Ok(event) => {
                        if !passes_filter(&event, &entity_filter) {
                            continue;
                        }
                        match serde_json::to_string(&event) {
                            Ok(json) => {
                                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                                    debug!("WebSocket send failed, client disconnected");
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("failed to serialize board event: {e}");
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, skipping events");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("event bus closed, shutting down WebSocket");
                        break;
                    }
                }
            }

            // Periodic pings to detect dead clients.
            _ = ping_interval.tick() => {
                if ws_sender.send(Message::Ping(vec![].into())).await.is_err() {
                    debug!("ping failed, client disconnected");
                    break;
                }
            }

            // Incoming messages from the client (Pong, Close).
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore text/binary messages from clients.
                    }
                }
            }
        }
    }

    debug!("WebSocket connection closed");
}
