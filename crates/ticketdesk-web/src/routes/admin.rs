//! Administrator route handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use ticketdesk_core::{
    ticket::{
        self,
        model::{AdminTicket, Ticket, TicketStatus},
    },
    DeskError, TicketEvent,
};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

pub async fn list_complaints(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(query): Query<AdminListQuery>,
) -> ApiResult<Json<Vec<AdminTicket>>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(s) => Some(
            TicketStatus::parse(s).ok_or_else(|| DeskError::validation(format!("Invalid status: {}", s)))?,
        ),
    };
    let tickets = ticket::list_for_admin(&*state.store, status, query.q.as_deref()).await?;
    Ok(Json(tickets))
}

pub async fn update_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Ticket>> {
    let ticket = ticket::set_status(&*state.store, &id, req.status.trim()).await?;
    tracing::info!(
        ticket_id = %ticket.id,
        status = ticket.status.as_str(),
        by = %admin.student_id,
        "Complaint status changed"
    );
    state.publish(TicketEvent::updated(&ticket)).await;
    Ok(Json(ticket))
}
