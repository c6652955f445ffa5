//! Server-side session storage.
//!
//! Sessions are keyed by the SHA-256 hash of the opaque token carried in the
//! browser cookie; the raw token never enters the store. The trait keeps the
//! endpoint layer independent of the backing, so an in-memory map can later
//! be swapped for a distributed cache without touching handlers.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;

use crate::db::UserResponse;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session backend error: {0}")]
    Backend(String),
}

/// Snapshot stored per live session.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a live session. Expired sessions behave as absent.
    async fn get(&self, token_hash: &str) -> Result<Option<SessionData>, SessionError>;

    /// Store a session under a token hash, replacing any previous entry.
    async fn set(&self, token_hash: &str, data: SessionData) -> Result<(), SessionError>;

    /// Destroy a session. Destroying an absent session is a no-op success.
    async fn destroy(&self, token_hash: &str) -> Result<(), SessionError>;
}

/// In-memory session store. Each token's lifecycle is owned by the request
/// that created or destroys it, so per-entry map operations are enough and
/// no cross-token locking is needed.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry. Called periodically from a background task;
    /// `get` also filters lazily, so the sweep only bounds memory.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, data| data.expires_at > now);
        before - self.sessions.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token_hash: &str) -> Result<Option<SessionData>, SessionError> {
        if let Some(entry) = self.sessions.get(token_hash) {
            if entry.expires_at > Utc::now() {
                return Ok(Some(entry.clone()));
            }
        }
        // Expired entries are removed on sight
        self.sessions.remove(token_hash);
        Ok(None)
    }

    async fn set(&self, token_hash: &str, data: SessionData) -> Result<(), SessionError> {
        self.sessions.insert(token_hash.to_string(), data);
        Ok(())
    }

    async fn destroy(&self, token_hash: &str) -> Result<(), SessionError> {
        self.sessions.remove(token_hash);
        Ok(())
    }
}
