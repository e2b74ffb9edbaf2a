use async_trait::async_trait;
use redis::aio::ConnectionManager as RedisConnectionManager;
use redis::AsyncCommands;

use crate::error::{AppError, AppResult};
use crate::session::{SessionData, SessionStore};

/// Redis keys structure:
/// - lumon:sessions:{key}   - String holding the session data (JSON), with TTL
const SESSION_PREFIX: &str = "lumon:sessions:";

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: RedisConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: RedisConnectionManager) -> Self {
        Self { conn }
    }

    fn session_key(key: &str) -> String {
        format!("{}{}", SESSION_PREFIX, key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_key: &str) -> AppResult<Option<SessionData>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::session_key(session_key)).await?;

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    // Unreadable sessions are treated as absent
                    tracing::warn!(error = %e, "Discarding malformed session");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        session_key: &str,
        data: &SessionData,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(data)
            .map_err(|e| AppError::Session(format!("Serialization error: {}", e)))?;

        let _: () = conn
            .set_ex(Self::session_key(session_key), json, ttl_seconds.max(1))
            .await?;

        Ok(())
    }

    async fn delete(&self, session_key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::session_key(session_key)).await?;
        Ok(())
    }
}
