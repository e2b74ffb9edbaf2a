pub mod data;
pub mod handle;
pub mod memory_store;
pub mod redis_store;

pub use data::{FlashLevel, FlashMessage, SessionData, SessionIdentity};
pub use handle::Session;
pub use memory_store::InMemorySessionStore;
pub use redis_store::RedisSessionStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;

/// Name of the cookie carrying the session key
pub const SESSION_COOKIE: &str = "lumon_session";

/// Server-side session persistence, keyed by the opaque id kept in the cookie
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session; expired or unknown keys yield `None`
    async fn load(&self, session_key: &str) -> AppResult<Option<SessionData>>;

    /// Create or replace a session, expiring after `ttl_seconds`
    async fn save(&self, session_key: &str, data: &SessionData, ttl_seconds: u64)
        -> AppResult<()>;

    /// Delete a session; unknown keys are ignored
    async fn delete(&self, session_key: &str) -> AppResult<()>;
}

/// Generate a fresh 256-bit session key
pub fn generate_session_key() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
