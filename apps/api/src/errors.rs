use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::OracleError;

/// Postgres SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("User not found")]
    UserNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Text oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Malformed oracle response: {0}")]
    MalformedOracleResponse(String),

    #[error("Insight shape invalid: {0}")]
    InsightShapeInvalid(String),

    #[error("Transaction exceeded its {}s budget", .0.as_secs())]
    TransactionTimeout(Duration),

    #[error("Uniqueness violation: {0}")]
    UniquenessViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let is_unique = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == PG_UNIQUE_VIOLATION);
        if is_unique {
            AppError::UniquenessViolation(err.to_string())
        } else {
            AppError::Database(err)
        }
    }
}

impl From<OracleError> for AppError {
    fn from(err: OracleError) -> Self {
        AppError::OracleUnavailable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::OracleUnavailable(msg) => {
                tracing::error!("Text oracle unavailable: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "ORACLE_UNAVAILABLE",
                    "The AI service is unavailable, please try again later".to_string(),
                )
            }
            AppError::MalformedOracleResponse(msg) => {
                tracing::error!("Malformed oracle response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_ORACLE_RESPONSE",
                    "The AI service returned an unreadable response".to_string(),
                )
            }
            AppError::InsightShapeInvalid(msg) => {
                tracing::error!("Oracle output failed shape validation: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "INSIGHT_SHAPE_INVALID",
                    "The AI service returned an incomplete analysis".to_string(),
                )
            }
            AppError::TransactionTimeout(budget) => {
                tracing::error!("Transaction timed out after {}s", budget.as_secs());
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TRANSACTION_TIMEOUT",
                    "The operation took too long and was rolled back".to_string(),
                )
            }
            AppError::UniquenessViolation(msg) => {
                tracing::warn!("Uniqueness violation: {msg}");
                (
                    StatusCode::CONFLICT,
                    "UNIQUENESS_VIOLATION",
                    "The record was created concurrently, please retry".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
