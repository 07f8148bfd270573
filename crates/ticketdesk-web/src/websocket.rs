//! WebSocket endpoint of the notification channel.
//!
//! Every connection is one session. Ticket messages a client sends are
//! relayed to all other sessions; frames published by the server reach the
//! client through its session queue.

use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use ticketdesk_core::wire::{self, Parsed};
use tracing::{debug, info, warn};

use crate::channel::{Session, SessionId, SessionRegistry};
use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<AppState>,
) -> Response {
    match ws {
        Ok(ws) => {
            let registry = state.channel.clone();
            ws.on_failed_upgrade(|e| warn!(error = %e, "WebSocket upgrade failed"))
                .on_upgrade(move |socket| handle_socket(socket, registry))
        }
        Err(rejection) => {
            warn!(status = %rejection.status(), reason = %rejection.body_text(), "Rejected WebSocket upgrade");
            (rejection.status(), format!("WebSocket upgrade required: {}", rejection.body_text())).into_response()
        }
    }
}

/// Handle one connection from open to close.
async fn handle_socket(socket: WebSocket, registry: SessionRegistry) {
    let (mut sender, mut receiver) = socket.split();
    let Session { id, mut frames } = registry.register();
    info!(session_id = id, sessions = registry.len(), "WebSocket client connected");

    // Forward queued frames to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if sender.send(Message::Text(Utf8Bytes::from(&*frame))).await.is_err() {
                debug!(session_id = id, "WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    // Relay ticket messages from this client to everyone else
    let relay = registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => relay_message(&relay, id, text.as_str()),
                Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                    Ok(text) => relay_message(&relay, id, text),
                    Err(e) => {
                        warn!(session_id = id, error = %e, "Dropping binary WebSocket message that is not UTF-8");
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!(session_id = id, "WebSocket client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(session_id = id, error = %e, "WebSocket receive failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.unregister(id);
    info!(session_id = id, sessions = registry.len(), "WebSocket client disconnected");
}

fn relay_message(registry: &SessionRegistry, origin: SessionId, text: &str) {
    match wire::parse_inbound(text) {
        Ok(Parsed::Event(event)) => {
            debug!(
                session_id = origin,
                kind = event.kind.as_str(),
                ticket_id = event.ticket_id().unwrap_or("-"),
                "Relaying ticket message"
            );
            registry.publish_event(&event, Some(origin));
        }
        Ok(Parsed::Unrecognized(kind)) => {
            debug!(session_id = origin, kind = %kind, "Ignoring message of unknown type");
        }
        Err(e) => {
            warn!(session_id = origin, error = %e, "Dropping malformed WebSocket message");
        }
    }
}
