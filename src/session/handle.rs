use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::session::{FlashLevel, FlashMessage, SessionData, SessionIdentity};

/// Request-scoped view of the caller's session.
///
/// Loaded by `session_middleware` before the handler runs and persisted by it
/// afterwards. Handlers take it as an extractor:
/// `async fn handler(session: Session) -> ... { }`
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug)]
pub(crate) struct SessionState {
    /// Key the request arrived with, if it matched a stored session
    pub(crate) key: Option<String>,
    pub(crate) data: SessionData,
    pub(crate) modified: bool,
    /// Issue a new key on save (login, logout)
    pub(crate) rotate: bool,
}

impl Session {
    pub(crate) fn new(key: Option<String>, data: SessionData) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                key,
                data,
                modified: false,
                rotate: false,
            })),
        }
    }

    pub(crate) async fn into_state(self) -> SessionState {
        let state = self.inner.lock().await;
        SessionState {
            key: state.key.clone(),
            data: state.data.clone(),
            modified: state.modified,
            rotate: state.rotate,
        }
    }

    pub async fn identity(&self) -> Option<SessionIdentity> {
        self.inner.lock().await.data.identity.clone()
    }

    /// Store the identity of a freshly authenticated user under a new key
    pub async fn login(&self, identity: SessionIdentity) {
        let mut state = self.inner.lock().await;
        state.data.identity = Some(identity);
        state.modified = true;
        state.rotate = true;
    }

    /// Drop everything, identity and pending messages alike
    pub async fn flush(&self) {
        let mut state = self.inner.lock().await;
        state.data = SessionData::default();
        state.modified = true;
        state.rotate = true;
    }

    pub async fn flash(&self, level: FlashLevel, text: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.data.messages.push(FlashMessage {
            level,
            text: text.into(),
        });
        state.modified = true;
    }

    pub async fn success(&self, text: impl Into<String>) {
        self.flash(FlashLevel::Success, text).await;
    }

    pub async fn info(&self, text: impl Into<String>) {
        self.flash(FlashLevel::Info, text).await;
    }

    pub async fn warning(&self, text: impl Into<String>) {
        self.flash(FlashLevel::Warning, text).await;
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.flash(FlashLevel::Error, text).await;
    }

    /// Pending messages, removed from the session once read
    pub async fn take_messages(&self) -> Vec<FlashMessage> {
        let mut state = self.inner.lock().await;
        if state.data.messages.is_empty() {
            return Vec::new();
        }
        state.modified = true;
        std::mem::take(&mut state.data.messages)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session middleware is not installed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_are_read_once() {
        let session = Session::new(None, SessionData::default());
        session.success("Departamento cadastrado com sucesso!").await;

        let messages = session.take_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, FlashLevel::Success);
        assert!(session.take_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_flush_clears_identity_and_rotates() {
        let session = Session::new(
            Some("key".to_string()),
            SessionData {
                identity: Some(SessionIdentity {
                    user_id: 1,
                    user_name: "Mark Scout".to_string(),
                    user_email: "mark@lumon.com".to_string(),
                    profile_name: "Gerente".to_string(),
                }),
                messages: Vec::new(),
            },
        );

        session.flush().await;
        assert!(session.identity().await.is_none());

        let state = session.into_state().await;
        assert!(state.modified);
        assert!(state.rotate);
        assert_eq!(state.key.as_deref(), Some("key"));
    }

    #[tokio::test]
    async fn test_untouched_session_is_not_modified() {
        let session = Session::new(None, SessionData::default());
        assert!(session.take_messages().await.is_empty());
        assert!(!session.into_state().await.modified);
    }
}
