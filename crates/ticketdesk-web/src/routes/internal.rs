//! Internal notification endpoint.

use axum::{extract::State, http::StatusCode, Json};
use ticketdesk_core::wire::{self, OutboundMessage};
use tracing::{debug, info};

use crate::state::AppState;

/// Receive a ticket change from another process and fan it out to every
/// open session.
pub async fn notify(
    State(state): State<AppState>,
    Json(mut msg): Json<OutboundMessage>,
) -> StatusCode {
    info!(
        kind = msg.kind.as_str(),
        ticket_id = wire::ticket_id(&msg.data).unwrap_or("-"),
        "Received internal notification, broadcasting to sessions"
    );
    msg.data = wire::enrich(msg.data);
    let delivery = state.channel.publish(&msg, None);
    debug!(delivered = delivery.delivered, failed = delivery.failed, "Internal notification delivered");
    StatusCode::OK
}
