//! Login session queries (Redis).

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::RedisStore;
use crate::client::StoreResult;
use crate::repository::SessionRepository;

/// Stored login session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRow {
    pub token: String,
    pub student_id: String,
    pub role: String,
    pub created_at: String,
}

fn session_key(token: &str) -> String {
    format!("td:session:{}", token)
}

#[async_trait]
impl SessionRepository for RedisStore {
    async fn put_session(&self, row: &SessionRow, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn();
        let json = serde_json::to_string(row)?;
        let secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(session_key(&row.token), json, secs).await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> StoreResult<Option<SessionRow>> {
        let mut conn = self.conn();
        let json: Option<String> = conn.get(session_key(token)).await?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        let mut conn = self.conn();
        conn.del::<_, ()>(session_key(token)).await?;
        Ok(())
    }
}
