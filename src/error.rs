//!
//! # Custom Error Handling
//!
//! `AppError` is the error type returned by every request handler. It
//! implements `actix_web::ResponseError` so handlers can use `?` and still
//! produce the JSON bodies clients expect:
//!
//! - client errors that explain a rejected input carry `{"message": ...}`,
//! - lookups that found nothing or collided carry `{"error": ...}`,
//! - server faults are logged and answered with a generic body.
//!
//! `From` conversions exist for `sqlx::Error`, `validator::ValidationErrors`
//! and `CredentialError`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::CredentialError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected input (HTTP 400).
    #[error("{0}")]
    Validation(String),
    /// Authentication required or failed (HTTP 401).
    #[error("{0}")]
    Unauthorized(String),
    /// Wrong email or password at login (HTTP 401).
    #[error("Login failed: {0}")]
    LoginFailed(String),
    /// HTTP 404.
    #[error("{0}")]
    NotFound(String),
    /// A unique value is already taken (HTTP 409).
    #[error("{0}")]
    Conflict(String),
    /// HTTP 500. The client never sees the driver message.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    /// HTTP 500.
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// HTTP 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::LoginFailed(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Credential(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(msg) | AppError::Unauthorized(msg) => json!({ "message": msg }),
            AppError::LoginFailed(reason) => json!({ "message": "Login failed", "error": reason }),
            AppError::NotFound(msg) | AppError::Conflict(msg) => json!({ "error": msg }),
            AppError::Database(_) | AppError::Credential(_) | AppError::Internal(_) => {
                log::error!("{}", self);
                json!({ "message": "Internal server error" })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// `RowNotFound` becomes a 404 and unique-constraint violations a 409;
/// anything else is a 500.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Resource already exists".into())
            }
            _ => AppError::Database(error),
        }
    }
}

impl AppError {
    /// Replaces the message of a `Conflict`; any other error passes through.
    pub fn conflict_as(self, message: &str) -> AppError {
        match self {
            AppError::Conflict(_) => AppError::Conflict(message.to_string()),
            other => other,
        }
    }

    /// Reports the message of the first failing field in `order`.
    ///
    /// Failing fields not listed in `order` come after it, in name order.
    pub fn from_validation_ordered(errors: ValidationErrors, order: &[&str]) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| {
            let rank = order
                .iter()
                .position(|name| name == field)
                .unwrap_or(order.len());
            (rank, *field)
        });

        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()));

        AppError::Validation(message.unwrap_or_else(|| errors.to_string()))
    }
}

/// Picks the first message, visiting fields in name order so the choice is stable.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        AppError::from_validation_ordered(errors, &[])
    }
}
