//! Ticket queries (Redis).

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use super::{creation_score, RedisStore};
use crate::client::{StoreError, StoreResult};
use crate::repository::TicketRepository;

/// Stored ticket document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRow {
    pub id: String,
    pub student_id: String,
    pub complaint_type: String,
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub comments: Vec<CommentRow>,
    pub created_at: String,
    pub updated_at: String,
}

/// Stored comment, embedded in its ticket document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRow {
    pub author_id: String,
    pub content: String,
    pub is_admin_comment: bool,
    pub created_at: String,
}

fn ticket_key(id: &str) -> String {
    format!("td:ticket:{}", id)
}

const ALL_KEY: &str = "td:tickets:all";

fn student_key(student_id: &str) -> String {
    format!("td:tickets:student:{}", student_id)
}

fn status_key(status: &str) -> String {
    format!("td:tickets:status:{}", status)
}

impl RedisStore {
    async fn load_tickets(&self, ids: Vec<String>) -> StoreResult<Vec<TicketRow>> {
        let mut tickets = Vec::with_capacity(ids.len());
        for id in ids {
            let mut conn = self.conn();
            let json: Option<String> = conn.hget(ticket_key(&id), "data").await?;
            if let Some(j) = json {
                match serde_json::from_str::<TicketRow>(&j) {
                    Ok(row) => tickets.push(row),
                    Err(e) => tracing::warn!(ticket_id = %id, error = %e, "Skipping unreadable ticket document"),
                }
            }
        }
        Ok(tickets)
    }
}

#[async_trait]
impl TicketRepository for RedisStore {
    async fn insert_ticket(&self, row: &TicketRow) -> StoreResult<()> {
        let mut conn = self.conn();
        let key = ticket_key(&row.id);
        let json = serde_json::to_string(row)?;
        let created: bool = conn.hset_nx(&key, "data", &json).await?;
        if !created {
            return Err(StoreError::Conflict(format!("Ticket: {}", row.id)));
        }
        conn.hset::<_, _, _, ()>(&key, "status", &row.status).await?;

        let score = creation_score(&row.created_at);
        conn.zadd::<_, _, _, ()>(ALL_KEY, &row.id, score).await?;
        conn.zadd::<_, _, _, ()>(student_key(&row.student_id), &row.id, score).await?;
        conn.sadd::<_, _, ()>(status_key(&row.status), &row.id).await?;
        Ok(())
    }

    async fn get_ticket(&self, id: &str) -> StoreResult<TicketRow> {
        let mut conn = self.conn();
        let json: Option<String> = conn.hget(ticket_key(id), "data").await?;
        match json {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Err(StoreError::NotFound(format!("Ticket: {}", id))),
        }
    }

    async fn save_ticket(&self, row: &TicketRow) -> StoreResult<()> {
        let mut conn = self.conn();
        let key = ticket_key(&row.id);
        let old_status: Option<String> = conn.hget(&key, "status").await?;
        let Some(old_status) = old_status else {
            return Err(StoreError::NotFound(format!("Ticket: {}", row.id)));
        };

        conn.hset::<_, _, _, ()>(&key, "data", serde_json::to_string(row)?).await?;
        conn.hset::<_, _, _, ()>(&key, "status", &row.status).await?;

        if old_status != row.status {
            conn.srem::<_, _, ()>(status_key(&old_status), &row.id).await?;
            conn.sadd::<_, _, ()>(status_key(&row.status), &row.id).await?;
        }
        Ok(())
    }

    async fn delete_ticket(&self, id: &str) -> StoreResult<bool> {
        let row = match self.get_ticket(id).await {
            Ok(row) => row,
            Err(StoreError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        let mut conn = self.conn();
        conn.del::<_, ()>(ticket_key(id)).await?;
        conn.zrem::<_, _, ()>(ALL_KEY, id).await?;
        conn.zrem::<_, _, ()>(student_key(&row.student_id), id).await?;
        conn.srem::<_, _, ()>(status_key(&row.status), id).await?;
        Ok(true)
    }

    async fn list_tickets(&self) -> StoreResult<Vec<TicketRow>> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.zrevrange(ALL_KEY, 0, -1).await?;
        self.load_tickets(ids).await
    }

    async fn list_tickets_by_student(&self, student_id: &str) -> StoreResult<Vec<TicketRow>> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.zrevrange(student_key(student_id), 0, -1).await?;
        self.load_tickets(ids).await
    }

    async fn list_tickets_by_status(&self, status: &str) -> StoreResult<Vec<TicketRow>> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.smembers(status_key(status)).await?;
        let mut tickets = self.load_tickets(ids).await?;
        tickets.sort_by_key(|t| std::cmp::Reverse(creation_score(&t.created_at)));
        Ok(tickets)
    }
}
