use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

use crate::error::AppResult;
use crate::session::{SessionData, SessionStore};

/// In-memory session store, used when no Redis is configured and in tests.
/// Sessions are lost on restart.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, StoredSession>>>,
}

struct StoredSession {
    data: SessionData,
    expires_at: OffsetDateTime,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_key: &str) -> AppResult<Option<SessionData>> {
        let mut sessions = self.sessions.lock().await;

        let expired = match sessions.get(session_key) {
            Some(stored) if stored.expires_at > OffsetDateTime::now_utc() => {
                return Ok(Some(stored.data.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            sessions.remove(session_key);
        }
        Ok(None)
    }

    async fn save(
        &self,
        session_key: &str,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let ttl = Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));
        let expires_at = OffsetDateTime::now_utc().saturating_add(ttl);

        self.sessions.lock().await.insert(
            session_key.to_string(),
            StoredSession {
                data: data.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, session_key: &str) -> AppResult<()> {
        self.sessions.lock().await.remove(session_key);
        Ok(())
    }
}
