//! Redis implementation of the repositories.
//!
//! Key layout (all keys share the `td:` prefix):
//!
//! - `td:ticket:{id}` hash with the JSON document in `data` and the current `status`
//! - `td:tickets:all` sorted set of ticket ids scored by creation millis
//! - `td:tickets:student:{student_id}` sorted set, same scores
//! - `td:tickets:status:{status}` set of ticket ids
//! - `td:user:{student_id}` hash with the JSON document in `data`
//! - `td:users:all` set of student ids
//! - `td:session:{token}` string with an expiry

pub mod sessions;
pub mod tickets;
pub mod users;

use crate::client::RedisPool;

/// Redis-backed store.
#[derive(Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Connect to the given URL.
    pub async fn connect(redis_url: &str) -> crate::StoreResult<Self> {
        let pool = crate::client::init_pool(redis_url).await?;
        Ok(Self::new(pool))
    }

    /// Round-trip a PING to verify the connection.
    pub async fn ping(&self) -> crate::StoreResult<()> {
        let mut conn = self.pool.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> RedisPool {
        self.pool.clone()
    }
}

/// Sorted-set score for a document timestamp. Unparseable timestamps sort as now.
pub(crate) fn creation_score(created_at: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(created_at)
        .map(|t| t.timestamp_millis())
        .unwrap_or_else(|_| chrono::Utc::now().timestamp_millis())
}
