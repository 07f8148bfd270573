//! Ticket comment handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ticketdesk_core::{
    ticket::{self, model::Comment},
    DeskError,
};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub content: String,
}

async fn check_access(state: &AppState, user: &CurrentUser, id: &str) -> ApiResult<()> {
    let ticket = ticket::get_ticket(&*state.store, id).await?;
    if !user.caller.can_access(&ticket.student_id) {
        return Err(DeskError::forbidden("You can only access your own complaints").into());
    }
    Ok(())
}

pub async fn list_comments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Comment>>> {
    check_access(&state, &user, &id).await?;
    let comments = ticket::list_comments(&*state.store, &id).await?;
    Ok(Json(comments))
}

/// Add a comment. Whether it counts as an admin comment comes from the
/// session, never from the body.
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    check_access(&state, &user, &id).await?;
    let comment = ticket::add_comment(
        &*state.store,
        &id,
        &user.caller.student_id,
        &req.content,
        user.caller.is_admin(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
