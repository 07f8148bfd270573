//! HTTP error responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use ticketdesk_core::DeskError;
use ticketdesk_store::StoreError;

/// Error returned by route handlers.
#[derive(Debug)]
pub enum ApiError {
    Desk(DeskError),
    TooManyRequests { retry_after: Duration },
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Desk(e) => match e {
                DeskError::Validation(_) => StatusCode::BAD_REQUEST,
                DeskError::InvalidCredentials(_) | DeskError::Unauthorized => StatusCode::UNAUTHORIZED,
                DeskError::Forbidden(_) => StatusCode::FORBIDDEN,
                DeskError::TicketNotFound(_) | DeskError::UserNotFound(_) => StatusCode::NOT_FOUND,
                DeskError::Conflict(_) | DeskError::TicketClosed(_) => StatusCode::CONFLICT,
                DeskError::Store(StoreError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
                DeskError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
                DeskError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            Self::TooManyRequests { .. } => ErrorBody {
                message: "Too many login attempts. Please try again later.".to_string(),
                errors: None,
            },
            Self::Desk(DeskError::Validation(errors)) => ErrorBody {
                message: errors
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Validation failed".to_string()),
                errors: Some(errors.clone()),
            },
            Self::Desk(DeskError::Unauthorized) => ErrorBody {
                message: "Authentication required".to_string(),
                errors: None,
            },
            Self::Desk(DeskError::TicketNotFound(_)) => ErrorBody {
                message: "Complaint not found".to_string(),
                errors: None,
            },
            Self::Desk(DeskError::UserNotFound(_)) => ErrorBody {
                message: "User not found".to_string(),
                errors: None,
            },
            Self::Desk(DeskError::TicketClosed(_)) => ErrorBody {
                message: "Resolved complaints can no longer be edited".to_string(),
                errors: None,
            },
            Self::Desk(e) if self.status().is_server_error() => ErrorBody {
                message: match e {
                    DeskError::Store(StoreError::Connection(_)) => "Ticket store unavailable".to_string(),
                    _ => "Internal server error".to_string(),
                },
                errors: None,
            },
            Self::Desk(e) => ErrorBody {
                message: e.to_string(),
                errors: None,
            },
        }
    }
}

impl From<DeskError> for ApiError {
    fn from(e: DeskError) -> Self {
        Self::Desk(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Desk(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = ?self, "Request rejected");
        }

        let body = Json(self.body());
        match self {
            Self::TooManyRequests { retry_after } => {
                let secs = retry_after.as_secs().max(1).to_string();
                (status, [(header::RETRY_AFTER, secs)], body).into_response()
            }
            Self::Desk(_) => (status, body).into_response(),
        }
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DeskError::validation("x"), StatusCode::BAD_REQUEST),
            (DeskError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DeskError::InvalidCredentials("x".into()), StatusCode::UNAUTHORIZED),
            (DeskError::forbidden("x"), StatusCode::FORBIDDEN),
            (DeskError::TicketNotFound("t".into()), StatusCode::NOT_FOUND),
            (DeskError::Conflict("x".into()), StatusCode::CONFLICT),
            (DeskError::TicketClosed("t".into()), StatusCode::CONFLICT),
            (
                DeskError::Store(StoreError::OperationFailed("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (DeskError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = ApiError::TooManyRequests {
            retry_after: Duration::from_secs(42),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
