//! Redis-backed token store for multi-server deployments.
//!
//! Each session's entry is a JSON `CachedToken` stored with `SET ... EX`, so
//! Redis drops it around the time the cache would treat it as expired.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::Timestamp;
use crate::domain::token::CachedToken;
use crate::ports::{TokenStore, TokenStoreError};

pub const DEFAULT_KEY_PREFIX: &str = "storefront:token";

#[derive(Clone)]
pub struct RedisTokenStore {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisTokenStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    fn redis_key(&self, session_key: &str) -> String {
        redis_key(&self.key_prefix, session_key)
    }
}

fn redis_key(prefix: &str, session_key: &str) -> String {
    format!("{}:{}", prefix, session_key)
}

/// Redis rejects `EX 0`, so entries that are already due get one second.
fn expiry_secs(token: &CachedToken, now: Timestamp) -> u64 {
    token.remaining_secs(now).max(1)
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn load(&self, session_key: &str) -> Result<Option<CachedToken>, TokenStoreError> {
        let mut conn = self.conn.clone();

        let value: Option<String> = conn
            .get(self.redis_key(session_key))
            .await
            .map_err(|e: redis::RedisError| TokenStoreError::Unavailable(e.to_string()))?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| TokenStoreError::Malformed(e.to_string()))
            })
            .transpose()
    }

    async fn store(&self, session_key: &str, token: &CachedToken) -> Result<(), TokenStoreError> {
        let json =
            serde_json::to_string(token).map_err(|e| TokenStoreError::Malformed(e.to_string()))?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(self.redis_key(session_key))
            .arg(json)
            .arg("EX")
            .arg(expiry_secs(token, Timestamp::now()))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| TokenStoreError::Unavailable(e.to_string()))
    }

    async fn remove(&self, session_key: &str) -> Result<(), TokenStoreError> {
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(self.redis_key(session_key))
            .await
            .map_err(|e: redis::RedisError| TokenStoreError::Unavailable(e.to_string()))
    }
}
