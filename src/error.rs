// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Covers both engine outcomes (attempt limits, availability windows) and
/// plumbing failures, and maps each onto an HTTP response.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed request body or session payload)
    BadRequest(String),

    // 400 Bad Request (malformed quiz definition or settings)
    ValidationError(String),

    // 401 Unauthorized
    AuthError(String),

    // 401 Unauthorized: the quiz requires an authenticated taker
    LoginRequired,

    // 403 Forbidden: caller does not own the quiz
    Forbidden(String),

    // 403 Forbidden: outside the availability window
    NotAvailable(String),

    // 403 Forbidden: attempts-allowed budget spent
    AttemptsExceeded { allowed: i32 },

    // 404 Not Found
    NotFound(String),

    // 409 Conflict: session already finalized
    AlreadySubmitted,

    // 409 Conflict
    Conflict(String),
}

impl AppError {
    /// Stable machine-readable kind, sent next to the human message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::ValidationError(_) => "validation_error",
            AppError::AuthError(_) => "unauthorized",
            AppError::LoginRequired => "login_required",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotAvailable(_) => "not_available",
            AppError::AttemptsExceeded { .. } => "attempts_exceeded",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadySubmitted => "already_submitted",
            AppError::Conflict(_) => "conflict",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::LoginRequired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_)
            | AppError::NotAvailable(_)
            | AppError::AttemptsExceeded { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadySubmitted | AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg)
            | AppError::BadRequest(msg)
            | AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotAvailable(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => write!(f, "{}", msg),
            AppError::LoginRequired => write!(f, "This quiz requires you to sign in"),
            AppError::AttemptsExceeded { allowed } => {
                write!(f, "Maximum attempts reached ({} allowed)", allowed)
            }
            AppError::AlreadySubmitted => write!(f, "This session has already been submitted"),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": error_message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_rejections_map_to_forbidden() {
        assert_eq!(
            AppError::AttemptsExceeded { allowed: 1 }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotAvailable("closed".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::LoginRequired.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::AlreadySubmitted.code(), "already_submitted");
        assert_eq!(
            AppError::ValidationError("x".into()).code(),
            "validation_error"
        );
    }
}
