//! In-process store used by tests and `serve --memory`.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::client::{StoreError, StoreResult};
use crate::queries::creation_score;
use crate::queries::sessions::SessionRow;
use crate::queries::tickets::TicketRow;
use crate::queries::users::UserRow;
use crate::repository::{SessionRepository, TicketRepository, UserRepository};

#[derive(Default)]
pub struct MemoryStore {
    tickets: RwLock<HashMap<String, TicketRow>>,
    users: RwLock<HashMap<String, UserRow>>,
    sessions: RwLock<HashMap<String, (SessionRow, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(&self, keep: impl Fn(&TicketRow) -> bool) -> Vec<TicketRow> {
        let mut rows: Vec<TicketRow> = self
            .tickets
            .read()
            .values()
            .filter(|row| keep(row))
            .cloned()
            .collect();
        rows.sort_by_key(|t| std::cmp::Reverse(creation_score(&t.created_at)));
        rows
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn insert_ticket(&self, row: &TicketRow) -> StoreResult<()> {
        let mut tickets = self.tickets.write();
        if tickets.contains_key(&row.id) {
            return Err(StoreError::Conflict(format!("Ticket: {}", row.id)));
        }
        tickets.insert(row.id.clone(), row.clone());
        Ok(())
    }

    async fn get_ticket(&self, id: &str) -> StoreResult<TicketRow> {
        self.tickets
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Ticket: {}", id)))
    }

    async fn save_ticket(&self, row: &TicketRow) -> StoreResult<()> {
        let mut tickets = self.tickets.write();
        match tickets.get_mut(&row.id) {
            Some(existing) => {
                *existing = row.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("Ticket: {}", row.id))),
        }
    }

    async fn delete_ticket(&self, id: &str) -> StoreResult<bool> {
        Ok(self.tickets.write().remove(id).is_some())
    }

    async fn list_tickets(&self) -> StoreResult<Vec<TicketRow>> {
        Ok(self.newest_first(|_| true))
    }

    async fn list_tickets_by_student(&self, student_id: &str) -> StoreResult<Vec<TicketRow>> {
        Ok(self.newest_first(|t| t.student_id == student_id))
    }

    async fn list_tickets_by_status(&self, status: &str) -> StoreResult<Vec<TicketRow>> {
        Ok(self.newest_first(|t| t.status == status))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, row: &UserRow) -> StoreResult<()> {
        let mut users = self.users.write();
        if users.contains_key(&row.student_id) {
            return Err(StoreError::Conflict(format!("User: {}", row.student_id)));
        }
        users.insert(row.student_id.clone(), row.clone());
        Ok(())
    }

    async fn get_user(&self, student_id: &str) -> StoreResult<UserRow> {
        self.users
            .read()
            .get(student_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User: {}", student_id)))
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRow>> {
        let mut users: Vec<UserRow> = self.users.read().values().cloned().collect();
        users.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(users)
    }
}

/// Longer TTLs are treated as "never expires" without overflowing `Instant`.
const MAX_SESSION_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn put_session(&self, row: &SessionRow, ttl: Duration) -> StoreResult<()> {
        let expires_at = Instant::now() + ttl.min(MAX_SESSION_TTL);
        self.sessions
            .write()
            .insert(row.token.clone(), (row.clone(), expires_at));
        Ok(())
    }

    async fn get_session(&self, token: &str) -> StoreResult<Option<SessionRow>> {
        let mut sessions = self.sessions.write();
        match sessions.get(token) {
            Some((row, expires_at)) if *expires_at > Instant::now() => Ok(Some(row.clone())),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        self.sessions.write().remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(id: &str, student: &str, status: &str, created_at: &str) -> TicketRow {
        TicketRow {
            id: id.to_string(),
            student_id: student.to_string(),
            complaint_type: "grade".to_string(),
            description: "The midterm grade was never posted".to_string(),
            status: status.to_string(),
            comments: Vec::new(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_listings_are_newest_first_and_filtered() {
        let store = MemoryStore::new();
        store.insert_ticket(&ticket("a", "100", "open", "2024-01-01T00:00:00Z")).await.unwrap();
        store.insert_ticket(&ticket("b", "200", "resolved", "2024-01-02T00:00:00Z")).await.unwrap();
        store.insert_ticket(&ticket("c", "100", "open", "2024-01-03T00:00:00Z")).await.unwrap();

        let all: Vec<String> = store.list_tickets().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(all, vec!["c", "b", "a"]);

        let mine: Vec<String> = store
            .list_tickets_by_student("100")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(mine, vec!["c", "a"]);

        let open = store.list_tickets_by_status("open").await.unwrap();
        assert_eq!(open.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_ticket_id_conflicts() {
        let store = MemoryStore::new();
        let row = ticket("a", "100", "open", "2024-01-01T00:00:00Z");
        store.insert_ticket(&row).await.unwrap();
        assert!(matches!(store.insert_ticket(&row).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_save_missing_ticket_is_not_found() {
        let store = MemoryStore::new();
        let row = ticket("ghost", "100", "open", "2024-01-01T00:00:00Z");
        assert!(matches!(store.save_ticket(&row).await, Err(StoreError::NotFound(_))));
        assert!(!store.delete_ticket("ghost").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_is_gone() {
        let store = MemoryStore::new();
        let row = SessionRow {
            token: "tok".to_string(),
            student_id: "100".to_string(),
            role: "student".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        store.put_session(&row, Duration::from_secs(0)).await.unwrap();
        assert!(store.get_session("tok").await.unwrap().is_none());

        store.put_session(&row, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get_session("tok").await.unwrap(), Some(row));
        store.delete_session("tok").await.unwrap();
        assert!(store.get_session("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unbounded_ttl_keeps_session() {
        let store = MemoryStore::new();
        let row = SessionRow {
            token: "forever".to_string(),
            student_id: "100".to_string(),
            role: "admin".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        store.put_session(&row, Duration::MAX).await.unwrap();
        assert_eq!(store.get_session("forever").await.unwrap(), Some(row.clone()));

        store
            .put_session(&row, Duration::from_secs(u64::MAX))
            .await
            .unwrap();
        assert_eq!(store.get_session("forever").await.unwrap(), Some(row));
    }
}
