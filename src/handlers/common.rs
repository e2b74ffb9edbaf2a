use axum::response::Redirect;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::session::Session;

/// The logged-in user as shown in every screen's header
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub profile_name: String,
}

impl From<AuthUser> for CurrentUser {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile_name: user.profile_name,
        }
    }
}

/// `acao` field of the CRUD forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Create,
    Update,
    Delete,
}

impl FormAction {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "criar" => Some(FormAction::Create),
            "alterar" => Some(FormAction::Update),
            "excluir" => Some(FormAction::Delete),
            _ => None,
        }
    }
}

/// A form value counts as present when it is not blank
pub fn validate_required(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Blank optional values are treated as absent
pub fn validate_optional(value: Option<&str>) -> Option<String> {
    validate_required(value)
}

/// Parse a record id submitted by a form; unusable ids cannot match anything
pub fn parse_id(raw: Option<&str>, not_found: &str) -> AppResult<i32> {
    raw.and_then(|id| id.trim().parse().ok())
        .ok_or_else(|| AppError::NotFound(not_found.to_string()))
}

/// Report the outcome of a form action as a flash message and go back to
/// `screen`. Only unexpected failures escape as errors.
pub async fn redirect_with_outcome(
    session: &Session,
    screen: &str,
    outcome: AppResult<String>,
) -> AppResult<Redirect> {
    match outcome {
        Ok(message) => session.success(message).await,
        Err(e) if e.is_user_facing() => session.error(e.to_string()).await,
        Err(e) => return Err(e),
    }
    Ok(Redirect::to(screen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_action() {
        assert_eq!(FormAction::parse(Some("criar")), Some(FormAction::Create));
        assert_eq!(FormAction::parse(Some("alterar")), Some(FormAction::Update));
        assert_eq!(FormAction::parse(Some("excluir")), Some(FormAction::Delete));
        assert_eq!(FormAction::parse(Some("listar")), None);
        assert_eq!(FormAction::parse(None), None);
    }

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required(Some(" Bem Estar ")).as_deref(), Some("Bem Estar"));
        assert_eq!(validate_required(Some("   ")), None);
        assert_eq!(validate_required(None), None);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("7"), "x").unwrap(), 7);
        assert!(matches!(parse_id(Some("abc"), "x"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_id(None, "x"), Err(AppError::NotFound(_))));
    }
}
