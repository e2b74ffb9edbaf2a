use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::repositories::UserRepository;
use crate::session::{Session, SessionIdentity};
use crate::state::AppState;

/// Authenticated user taken from the session.
///
/// Extracting it is the auth gate: anonymous callers and sessions whose user
/// row has since been deleted are turned away to the login screen.
/// Example: `async fn handler(user: AuthUser) -> ... { }`
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub profile_name: String,
}

impl From<SessionIdentity> for AuthUser {
    fn from(identity: SessionIdentity) -> Self {
        Self {
            id: identity.user_id,
            name: identity.user_name,
            email: identity.user_email,
            profile_name: identity.profile_name,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;

        let Some(identity) = session.identity().await else {
            session.warning(AppError::Unauthorized.to_string()).await;
            return Err(AppError::Unauthorized);
        };

        if !UserRepository::exists(&state.db, identity.user_id).await? {
            tracing::info!(user_id = identity.user_id, "Session refers to a deleted user");
            session.flush().await;
            session.error(AppError::InvalidSession.to_string()).await;
            return Err(AppError::InvalidSession);
        }

        Ok(identity.into())
    }
}
