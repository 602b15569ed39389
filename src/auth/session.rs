use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("malformed session record")]
    Malformed,
    #[error("session store backend: {0}")]
    Backend(String),
}

/// The revocable server-side half of an authenticated session: who logged
/// in and from which address. One record exists per issued token; deleting
/// it revokes the token ahead of its embedded expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub admin_id: i32,
    pub ip: String,
}

impl SessionRecord {
    pub fn new(admin_id: i32, ip: impl Into<String>) -> Self {
        Self {
            admin_id,
            ip: ip.into(),
        }
    }

    /// Wire format stored in the cache: `"<admin_id>:<ip>"`.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.admin_id, self.ip)
    }

    /// Parse the wire format. Splits on the first `:` only, so IPv6
    /// addresses in the tail survive.
    pub fn parse(raw: &str) -> Result<Self, SessionStoreError> {
        let (id, ip) = raw.split_once(':').ok_or(SessionStoreError::Malformed)?;
        let admin_id = id.parse().map_err(|_| SessionStoreError::Malformed)?;
        if ip.is_empty() {
            return Err(SessionStoreError::Malformed);
        }
        Ok(Self {
            admin_id,
            ip: ip.to_string(),
        })
    }
}

/// Keyed by the exact token string. Entries expire on their own after `ttl`;
/// `delete` is the early-revocation path and must be idempotent.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(
        &self,
        token: &str,
        record: SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError>;

    async fn delete(&self, token: &str) -> Result<(), SessionStoreError>;
}

/// In-process session store with lazy expiry. Single-process development
/// and tests; production uses the Redis-backed store.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, (SessionRecord, Instant)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(
        &self,
        token: &str,
        record: SessionRecord,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(token.to_string(), (record, Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(token) {
                Some((record, deadline)) if Instant::now() < *deadline => {
                    return Ok(Some(record.clone()))
                }
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.entries.write().await.remove(token);
        }
        Ok(None)
    }

    async fn delete(&self, token: &str) -> Result<(), SessionStoreError> {
        self.entries.write().await.remove(token);
        Ok(())
    }
}
