//! Session extractors.
//!
//! A session token is read from `Authorization: Bearer <token>` or, failing
//! that, from a `token` cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use ticketdesk_core::{user, user::model::Caller, DeskError};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Any signed-in caller.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub caller: Caller,
    pub token: String,
}

/// A signed-in administrator.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Caller);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|t| !t.is_empty())
}

/// Token carried by a request, if any.
pub fn session_token(parts: &Parts) -> Option<&str> {
    bearer_token(parts).or_else(|| cookie_token(parts))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(DeskError::Unauthorized)?.to_string();
        let caller = user::resolve_session(&*state.store, &token).await?;
        Ok(Self { caller, token })
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser { caller, .. } = CurrentUser::from_request_parts(parts, state).await?;
        if !caller.is_admin() {
            return Err(DeskError::forbidden("Admin access required").into());
        }
        Ok(Self(caller))
    }
}
