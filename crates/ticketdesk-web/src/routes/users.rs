//! Account listing for administrators.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use ticketdesk_core::{
    user::{
        self,
        model::{Role, User},
    },
    DeskError,
};

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub q: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let role = match query.role.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(r) => Some(Role::parse(r).ok_or_else(|| DeskError::validation(format!("Invalid role: {}", r)))?),
    };
    let query = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let users = user::list_users(&*state.store, role, query).await?;
    Ok(Json(users))
}
