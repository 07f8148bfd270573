//! API route handlers.

pub mod admin;
pub mod auth;
pub mod comments;
pub mod complaints;
pub mod health;
pub mod internal;
pub mod users;

use serde::Serialize;

/// Body of responses that only carry a message.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
