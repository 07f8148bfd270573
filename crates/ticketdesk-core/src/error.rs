//! Centralized error types for ticketdesk.

use thiserror::Error;
use ticketdesk_store::StoreError;

/// Main error type for ticketdesk operations.
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Ticket is closed: {0}")]
    TicketClosed(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notification error: {0}")]
    Notify(String),
}

/// Result type for ticketdesk operations.
pub type DeskResult<T> = Result<T, DeskError>;

impl DeskError {
    /// Create a validation error with a single message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Create a forbidden error.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}
