//! User account queries (Redis).

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use super::RedisStore;
use crate::client::{StoreError, StoreResult};
use crate::repository::UserRepository;

/// Stored user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub password: String,
    pub email: Option<String>,
    pub course: Option<String>,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

fn user_key(student_id: &str) -> String {
    format!("td:user:{}", student_id)
}

const ALL_KEY: &str = "td:users:all";

#[async_trait]
impl UserRepository for RedisStore {
    async fn insert_user(&self, row: &UserRow) -> StoreResult<()> {
        let mut conn = self.conn();
        let json = serde_json::to_string(row)?;
        let created: bool = conn.hset_nx(user_key(&row.student_id), "data", &json).await?;
        if !created {
            return Err(StoreError::Conflict(format!("User: {}", row.student_id)));
        }
        conn.sadd::<_, _, ()>(ALL_KEY, &row.student_id).await?;
        Ok(())
    }

    async fn get_user(&self, student_id: &str) -> StoreResult<UserRow> {
        let mut conn = self.conn();
        let json: Option<String> = conn.hget(user_key(student_id), "data").await?;
        match json {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Err(StoreError::NotFound(format!("User: {}", student_id))),
        }
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRow>> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.smembers(ALL_KEY).await?;
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            let mut c = self.conn();
            let json: Option<String> = c.hget(user_key(&id), "data").await?;
            if let Some(j) = json {
                if let Ok(row) = serde_json::from_str::<UserRow>(&j) {
                    users.push(row);
                }
            }
        }
        users.sort_by(|a, b| a.student_id.cmp(&b.student_id));
        Ok(users)
    }
}
