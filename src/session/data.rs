use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Identity stored in the session after a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionIdentity {
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub profile_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One-shot message shown on the next rendered screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub identity: Option<SessionIdentity>,
    #[serde(default)]
    pub messages: Vec<FlashMessage>,
}

impl SessionData {
    /// Auth gate precondition: the session must carry an identity
    pub fn identity(&self) -> AppResult<&SessionIdentity> {
        self.identity.as_ref().ok_or(AppError::Unauthorized)
    }

    /// Nothing worth persisting
    pub fn is_empty(&self) -> bool {
        self.identity.is_none() && self.messages.is_empty()
    }
}
