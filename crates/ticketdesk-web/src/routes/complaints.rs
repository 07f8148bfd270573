//! Complaint route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ticketdesk_core::{
    ticket::{
        self,
        model::{NewTicket, Ticket, TicketEdit},
    },
    user::model::Caller,
    DeskError, TicketEvent,
};

use super::MessageResponse;
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StudentQuery {
    #[serde(rename = "studentId")]
    pub student_id: Option<String>,
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    pub id: Option<String>,
    pub complaint_type: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditComplaintRequest {
    pub complaint_type: Option<String>,
    pub description: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn ensure_access(caller: &Caller, owner: &str) -> Result<(), DeskError> {
    if caller.can_access(owner) {
        Ok(())
    } else {
        Err(DeskError::forbidden("You can only access your own complaints"))
    }
}

/// Load a ticket the caller is allowed to act on.
async fn owned_ticket(state: &AppState, caller: &Caller, id: &str) -> ApiResult<Ticket> {
    let ticket = ticket::get_ticket(&*state.store, id).await?;
    ensure_access(caller, &ticket.student_id)?;
    Ok(ticket)
}

pub async fn list_complaints(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<StudentQuery>,
) -> ApiResult<Json<Vec<Ticket>>> {
    let student_id = non_empty(query.student_id)
        .ok_or_else(|| DeskError::validation("Student ID is required"))?;
    ensure_access(&user.caller, &student_id)?;

    let tickets = ticket::list_for_student(&*state.store, &student_id).await?;
    Ok(Json(tickets))
}

pub async fn create_complaint(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut req): Json<NewTicket>,
) -> ApiResult<(StatusCode, Json<Ticket>)> {
    if req.student_id.trim().is_empty() && !user.caller.is_admin() {
        req.student_id = user.caller.student_id.clone();
    }
    ensure_access(&user.caller, req.student_id.trim())?;

    let ticket = ticket::create_ticket(&*state.store, &req).await?;
    state.publish(TicketEvent::created(&ticket)).await;

    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn update_complaint(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateComplaintRequest>,
) -> ApiResult<Json<Ticket>> {
    let id = non_empty(req.id);
    let complaint_type = non_empty(req.complaint_type);
    let description = non_empty(req.description);

    let mut missing = Vec::new();
    if id.is_none() {
        missing.push("Ticket ID is required".to_string());
    }
    if complaint_type.is_none() {
        missing.push("Complaint type is required".to_string());
    }
    if description.is_none() {
        missing.push("Description is required".to_string());
    }
    let (Some(id), Some(complaint_type), Some(description)) = (id, complaint_type, description) else {
        return Err(DeskError::Validation(missing).into());
    };

    owned_ticket(&state, &user.caller, &id).await?;
    let edit = TicketEdit {
        complaint_type: Some(complaint_type),
        description: Some(description),
        status: non_empty(req.status),
    };
    let ticket = ticket::edit_ticket(&*state.store, &id, &edit).await?;
    state.publish(TicketEvent::updated(&ticket)).await;

    Ok(Json(ticket))
}

pub async fn delete_complaint(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<MessageResponse>> {
    let id = non_empty(query.id).ok_or_else(|| DeskError::validation("Ticket ID is required"))?;
    owned_ticket(&state, &user.caller, &id).await?;
    ticket::delete_ticket(&*state.store, &id).await?;

    tracing::info!(ticket_id = %id, by = %user.caller.student_id, "Complaint deleted");
    Ok(Json(MessageResponse::new("Complaint deleted successfully")))
}

/// Student edit of a ticket's type and description.
pub async fn edit_complaint(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<EditComplaintRequest>,
) -> ApiResult<Json<Ticket>> {
    owned_ticket(&state, &user.caller, &id).await?;
    let edit = TicketEdit {
        complaint_type: non_empty(req.complaint_type),
        description: non_empty(req.description),
        status: None,
    };
    let ticket = ticket::edit_ticket(&*state.store, &id, &edit).await?;
    state.publish(TicketEvent::updated(&ticket)).await;

    Ok(Json(ticket))
}
