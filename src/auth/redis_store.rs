use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::session::{SessionRecord, SessionStore, SessionStoreError};

/// Key prefix shared with the original deployment's cache layout.
const KEY_PREFIX: &str = "admin:token:";

/// Redis-backed session store. Entries expire server-side after the token
/// TTL, so natural expiry needs no sweeper.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    /// Connect and verify the server is reachable.
    pub async fn connect(url: &str) -> Result<Self, SessionStoreError> {
        let client =
            redis::Client::open(url).map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        Ok(Self { conn })
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(
        &self,
        token: &str,
        record: SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(token), record.encode(), ttl.as_secs().max(1))
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(Self::key(token))
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))?;
        match raw {
            Some(raw) => Ok(Some(SessionRecord::parse(&raw)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        // DEL on an absent key is a no-op, which keeps logout idempotent
        conn.del::<_, ()>(Self::key(token))
            .await
            .map_err(|e| SessionStoreError::Backend(e.to_string()))
    }
}
