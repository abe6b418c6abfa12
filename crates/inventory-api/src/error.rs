//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory_auth::AuthError;
use inventory_core::{CoreError, ValidationErrors};
use inventory_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

/// Message for requests without a usable bearer credential
const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided or are invalid.";

fn detail(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "detail": message }))).into_response()
}

fn database_failure(e: &DbError) -> Response {
    error!("Repository failure: {}", e);
    detail(StatusCode::SERVICE_UNAVAILABLE, "Item store unavailable")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => detail(StatusCode::NOT_FOUND, &msg),
            ApiError::BadRequest(msg) => detail(StatusCode::BAD_REQUEST, &msg),
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, axum::Json(errors)).into_response()
            }
            ApiError::Core(e) => match e {
                CoreError::Validation(errors) => {
                    (StatusCode::BAD_REQUEST, axum::Json(errors)).into_response()
                }
                CoreError::NotFound(_) => detail(StatusCode::NOT_FOUND, "Not found."),
                CoreError::Repository(e) => database_failure(&e),
            },
            ApiError::Database(e) => match e {
                DbError::Duplicate(msg) => detail(StatusCode::BAD_REQUEST, &msg),
                DbError::Connection(_) => database_failure(&e),
            },
            ApiError::Auth(e) => match e {
                AuthError::PasswordHash(msg) => {
                    error!("Password hashing failed: {}", msg);
                    detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
                AuthError::InvalidCredentials => detail(
                    StatusCode::UNAUTHORIZED,
                    "No active account found with the given credentials",
                ),
                AuthError::TokenExpired
                | AuthError::InvalidToken
                | AuthError::WrongTokenType(_)
                | AuthError::Jwt(_) => {
                    detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired")
                }
                AuthError::MissingAuthHeader | AuthError::InvalidAuthHeader => {
                    detail(StatusCode::UNAUTHORIZED, NOT_AUTHENTICATED)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Auth(AuthError::MissingAuthHeader), StatusCode::UNAUTHORIZED),
            (ApiError::Core(CoreError::NotFound("Item 1".into())), StatusCode::NOT_FOUND),
            (
                ApiError::Core(CoreError::Validation(ValidationErrors::default())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Database(DbError::Duplicate("x".into())), StatusCode::BAD_REQUEST),
            (
                ApiError::Database(DbError::Connection(sqlx_pool_timeout())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::Auth(AuthError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (ApiError::Auth(AuthError::TokenExpired), StatusCode::UNAUTHORIZED),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    fn sqlx_pool_timeout() -> inventory_db::SqlxError {
        inventory_db::SqlxError::PoolTimedOut
    }
}
