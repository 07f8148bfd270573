//! Repository traits implemented by every storage backend.

use async_trait::async_trait;
use std::time::Duration;

use crate::client::StoreResult;
use crate::queries::sessions::SessionRow;
use crate::queries::tickets::TicketRow;
use crate::queries::users::UserRow;

/// Ticket documents.
///
/// Listings are returned newest first by creation time.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn insert_ticket(&self, row: &TicketRow) -> StoreResult<()>;
    async fn get_ticket(&self, id: &str) -> StoreResult<TicketRow>;
    /// Replace an existing document and keep the indexes in step.
    async fn save_ticket(&self, row: &TicketRow) -> StoreResult<()>;
    /// Returns `false` when no ticket had that id.
    async fn delete_ticket(&self, id: &str) -> StoreResult<bool>;
    async fn list_tickets(&self) -> StoreResult<Vec<TicketRow>>;
    async fn list_tickets_by_student(&self, student_id: &str) -> StoreResult<Vec<TicketRow>>;
    async fn list_tickets_by_status(&self, status: &str) -> StoreResult<Vec<TicketRow>>;
}

/// User accounts, keyed by student id.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `StoreError::Conflict` when the student id is taken.
    async fn insert_user(&self, row: &UserRow) -> StoreResult<()>;
    async fn get_user(&self, student_id: &str) -> StoreResult<UserRow>;
    async fn list_users(&self) -> StoreResult<Vec<UserRow>>;
}

/// Login sessions with a time-to-live.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn put_session(&self, row: &SessionRow, ttl: Duration) -> StoreResult<()>;
    /// `None` once the session expired or was deleted.
    async fn get_session(&self, token: &str) -> StoreResult<Option<SessionRow>>;
    async fn delete_session(&self, token: &str) -> StoreResult<()>;
}

/// Everything the application needs from a backend.
pub trait Store: TicketRepository + UserRepository + SessionRepository {}

impl<T> Store for T where T: TicketRepository + UserRepository + SessionRepository {}
