//! Signup, login and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ticketdesk_core::user::{
    self,
    model::{SignupRequest, User},
};

use super::MessageResponse;
use crate::auth::{CurrentUser, SESSION_COOKIE};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub user: User,
    pub token: String,
    pub redirect_url: String,
}

fn session_cookie(token: &str, ttl: Duration) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.as_secs()
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    headers
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<SignupResponse>)> {
    let created = user::signup(&*state.store, &req).await?;
    let outcome = user::login(&*state.store, &created.student_id, &req.password, state.session_ttl).await?;

    Ok((
        StatusCode::CREATED,
        session_cookie(&outcome.token, state.session_ttl),
        Json(SignupResponse {
            message: "Account created successfully".to_string(),
            user: outcome.user,
            token: outcome.token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<LoginResponse>)> {
    let student_id = req.student_id.trim();
    if student_id.is_empty() || req.password.is_empty() {
        return Err(ticketdesk_core::DeskError::validation("Student ID and password are required").into());
    }

    if let Err(retry_after) = state.login_limiter.check(student_id) {
        tracing::warn!(student_id = %student_id, "Login rate limit exceeded");
        return Err(ApiError::TooManyRequests { retry_after });
    }

    let outcome = user::login(&*state.store, student_id, &req.password, state.session_ttl).await?;
    state.login_limiter.reset(student_id);

    Ok((
        session_cookie(&outcome.token, state.session_ttl),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: outcome.user,
            token: outcome.token,
            redirect_url: outcome.redirect_url,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<(HeaderMap, Json<MessageResponse>)> {
    user::logout(&*state.store, &user.token).await?;
    tracing::debug!(student_id = %user.caller.student_id, "Logged out");
    Ok((
        session_cookie("", Duration::ZERO),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}
