use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use sea_orm::SqlErr;
use serde::Serialize;

/// Application error type that can be returned from handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Senha incorreta.")]
    InvalidCredentials,

    #[error("Você precisa fazer login primeiro.")]
    Unauthorized,

    #[error("Sessão inválida. Faça login novamente.")]
    InvalidSession,

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Delete blocked by rows that still reference the target
    #[error("{0}")]
    Integrity(String),

    // Validation errors
    #[error("{0}")]
    Validation(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // File storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Session store errors
    #[error("Session error: {0}")]
    Session(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Errors a screen reports back to the user as a flash message
    /// instead of failing the request.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::InvalidCredentials
                | AppError::NotFound(_)
                | AppError::Conflict(_)
                | AppError::Integrity(_)
                | AppError::Validation(_)
        )
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            // Gate failures send the browser back to the login screen
            AppError::Unauthorized | AppError::InvalidSession => {
                return Redirect::to("/").into_response();
            }

            // 401 Unauthorized
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials", None),

            // 404 Not Found
            AppError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "Not found", Some(resource.clone()))
            }

            // 409 Conflict
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),
            AppError::Integrity(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg.clone())),

            // 400 Bad Request
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),

            // 500 Internal Server Error
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error", None)
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error", None)
            }
            AppError::Session(msg) => {
                tracing::error!("Session error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

// Convenient conversions from common error types

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return AppError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return AppError::Integrity(msg),
            _ => {}
        }

        match err {
            sea_orm::DbErr::RecordNotFound(what) => AppError::NotFound(what),
            sea_orm::DbErr::RecordNotInserted => {
                AppError::Conflict("Record already exists".to_string())
            }
            sea_orm::DbErr::RecordNotUpdated => AppError::NotFound("Record".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Session(format!("Redis error: {}", err))
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::Validation(format!("Formulário inválido: {}", err.body_text()))
    }
}

impl From<axum::extract::multipart::MultipartRejection> for AppError {
    fn from(rejection: axum::extract::multipart::MultipartRejection) -> Self {
        AppError::Validation(format!("Formulário inválido: {}", rejection.body_text()))
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_errors() {
        assert!(AppError::Validation("x".into()).is_user_facing());
        assert!(AppError::Conflict("x".into()).is_user_facing());
        assert!(AppError::Integrity("x".into()).is_user_facing());
        assert!(AppError::NotFound("x".into()).is_user_facing());
        assert!(!AppError::Database("x".into()).is_user_facing());
        assert!(!AppError::Unauthorized.is_user_facing());
    }

    #[test]
    fn test_gate_errors_redirect_to_login() {
        let response = AppError::InvalidSession.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err: AppError = sea_orm::DbErr::RecordNotFound("Usuário".to_string()).into();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Usuário"));
    }
}
