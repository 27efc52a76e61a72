//! # Centralized Error Handling
//!
//! This module defines the application-wide error type [`AppError`] used consistently
//! across all backend modules. Handlers return [`Result<T>`] and propagate with `?`;
//! the [`IntoResponse`] implementation below is the single place where an error kind
//! becomes an HTTP status code and a JSON body.
//!
//! ## Error Categories
//!
//! | Variant | Status |
//! |---------|--------|
//! | [`Validation`](AppError::Validation) | 400, field messages joined with `", "` |
//! | [`BadRequest`](AppError::BadRequest) | 400 |
//! | [`Unauthenticated`](AppError::Unauthenticated) | 401 |
//! | [`NotFound`](AppError::NotFound) | 404 |
//! | [`InvalidId`](AppError::InvalidId) | 404, message depends on the [`Resource`] |
//! | [`Conflict`](AppError::Conflict) | 409, names the duplicated field |
//! | [`PayloadTooLarge`](AppError::PayloadTooLarge) | 413 |
//! | [`Config`](AppError::Config) / [`Internal`](AppError::Internal) | 500, generic message |
//!
//! ## Body
//!
//! ```text
//! { "error": "<human readable message>", "code": "<Variant>" }
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use lib_core::error::{AppError, Resource, Result};
//!
//! fn item_id(raw: &str) -> Result<i64> {
//!     lib_core::error::parse_id(Resource::Item, raw)
//! }
//!
//! assert!(matches!(item_id("abc"), Err(AppError::InvalidId { .. })));
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::dto::ErrorResponse;
use std::fmt;
use thiserror::Error;

/// Convenience type alias for `Result<T, AppError>`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Message sent to clients for every 5xx error.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong, try again later.";

/// Record kinds an identifier can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Item,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::User => write!(f, "user"),
            Resource::Item => write!(f, "item"),
        }
    }
}

/// Application-wide error type covering all error scenarios.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error during startup or environment loading.
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more fields failed schema validation.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Semantically invalid request (weak password, blank field on update, bad upload).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials or bearer token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Requested resource not found (or not owned by the caller).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A path identifier could not be parsed as an id of `resource`.
    #[error("Invalid {resource} id: {value}")]
    InvalidId { resource: Resource, value: String },

    /// Uniqueness violation on the named field.
    #[error("Duplicate value for field: {0}")]
    Conflict(String),

    /// Uploaded file exceeds the size limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (unexpected failures).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".to_string())
    }

    pub fn item_not_found(id: i64) -> Self {
        AppError::NotFound(format!("No item found with id : {}", id))
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::InvalidId { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// For internal errors, returns a generic message to avoid exposing implementation details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(messages) => messages.join(", "),
            AppError::BadRequest(msg)
            | AppError::Unauthenticated(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::InvalidId { resource: Resource::User, .. } => "User not found".to_string(),
            AppError::InvalidId { resource: Resource::Item, value } => {
                format!("No item found with id : {}", value)
            }
            AppError::Conflict(field) => {
                format!("{field} already exist, please choose another {field}")
            }
            AppError::Config(_) | AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Variant name sent as the `code` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::Validation(_) => "Validation",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidId { .. } => "InvalidId",
            AppError::Conflict(_) => "Conflict",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) => "Internal",
        }
    }
}

/// Parse a path identifier for `resource`.
///
/// Anything that is not a positive integer is reported as [`AppError::InvalidId`].
pub fn parse_id(resource: Resource, raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::InvalidId {
            resource,
            value: raw.to_string(),
        }),
    }
}

/// Implement Axum's `IntoResponse` for automatic error handling.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        // Log error details (full error message for server logs)
        if status.is_server_error() {
            tracing::error!("Server error: {}", self);
        } else {
            tracing::debug!("Client error: {}", self);
        }

        let body = Json(ErrorResponse::new(message, self.code()));

        (status, body).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Convert `sqlx::Error` to `AppError`.
///
/// Unique violations become [`AppError::Conflict`] naming the column, and
/// foreign-key violations (a reference to a user that no longer exists)
/// become "User not found".
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Database record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(unique_violation_field(db_err.message()))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::user_not_found()
            }
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert `serde_json::Error` to `AppError`.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

/// Rejections from the JSON body extractor (bad syntax, wrong types, missing
/// `Content-Type`) are client errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Weak passwords are a client error; hashing failures are internal.
impl From<lib_auth::pwd::Error> for AppError {
    fn from(err: lib_auth::pwd::Error) -> Self {
        match err {
            lib_auth::pwd::Error::WeakPassword => AppError::BadRequest(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

/// Token errors reaching a handler are signing failures, not client errors.
impl From<lib_auth::token::Error> for AppError {
    fn from(err: lib_auth::token::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Extract the column from SQLite's `UNIQUE constraint failed: users.email`.
fn unique_violation_field(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .and_then(|cols| cols.split(", ").next())
        .and_then(|col| col.rsplit('.').next())
        .filter(|col| !col.is_empty())
        .unwrap_or("value")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation(vec![]), StatusCode::BAD_REQUEST),
            (AppError::BadRequest(String::new()), StatusCode::BAD_REQUEST),
            (AppError::Unauthenticated(String::new()), StatusCode::UNAUTHORIZED),
            (AppError::user_not_found(), StatusCode::NOT_FOUND),
            (AppError::Conflict("email".into()), StatusCode::CONFLICT),
            (AppError::PayloadTooLarge(String::new()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::Internal(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
        }
    }

    #[test]
    fn test_validation_messages_joined() {
        let err = AppError::Validation(vec![
            "Please provide an item title".to_string(),
            "Please provide an item description".to_string(),
        ]);
        assert_eq!(
            err.user_message(),
            "Please provide an item title, Please provide an item description"
        );
    }

    #[test]
    fn test_invalid_id_messages() {
        let user = parse_id(Resource::User, "not-a-number").unwrap_err();
        assert_eq!(user.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(user.user_message(), "User not found");

        let item = parse_id(Resource::Item, "xyz").unwrap_err();
        assert_eq!(item.user_message(), "No item found with id : xyz");
    }

    #[test]
    fn test_parse_id_rejects_non_positive() {
        assert_eq!(parse_id(Resource::Item, "42").unwrap(), 42);
        assert!(parse_id(Resource::Item, "0").is_err());
        assert!(parse_id(Resource::Item, "-3").is_err());
    }

    #[test]
    fn test_conflict_message() {
        assert_eq!(
            AppError::Conflict("username".into()).user_message(),
            "username already exist, please choose another username"
        );
    }

    #[tokio::test]
    async fn test_response_body_is_error_response() {
        let response = AppError::item_not_found(7).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body, ErrorResponse::new("No item found with id : 7", "NotFound"));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("disk on fire".into());
        assert_eq!(err.user_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_unique_violation_field() {
        assert_eq!(unique_violation_field("UNIQUE constraint failed: users.email"), "email");
        assert_eq!(
            unique_violation_field("UNIQUE constraint failed: users.username, users.email"),
            "username"
        );
    }

    #[test]
    fn test_weak_password_is_bad_request() {
        let err: AppError = lib_auth::pwd::Error::WeakPassword.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), lib_auth::PASSWORD_STRENGTH_MESSAGE);
    }
}
