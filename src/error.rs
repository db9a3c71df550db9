//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failures a request can hit: duplicate registrations, bad credentials or tokens,
//! missing (or foreign) tasks and subtasks, and malformed input.
//!
//! `AppError` implements `actix_web::error::ResponseError` so that handlers can return it
//! directly; every variant renders as a JSON body of the form `{"detail": "..."}`.
//! `From` implementations for `jsonwebtoken::errors::Error` and `bcrypt::BcryptError`
//! allow easy conversion using the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;

/// Represents all possible errors that can occur within the application.
///
/// Each variant carries the message that is returned to the client as `detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Authentication failed (HTTP 401).
    /// Bad login credentials and every kind of invalid token collapse into this variant.
    Unauthorized(String),
    /// A client-side conflict or malformed request (HTTP 400), e.g. a duplicate username.
    BadRequest(String),
    /// The requested resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Request body, path or query failed to parse (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl AppError {
    /// The single 401 used for failed logins and rejected tokens.
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Invalid credentials".into())
    }

    pub fn task_not_found() -> Self {
        AppError::NotFound("Task not found".into())
    }

    pub fn subtask_not_found() -> Self {
        AppError::NotFound("Subtask not found".into())
    }

    fn detail(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::ValidationError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This implementation allows Actix Web to automatically translate `AppError`
/// results from handlers (and from `AuthMiddleware`) into the correct HTTP status
/// codes and `{"detail": ...}` bodies.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            response.insert_header(("WWW-Authenticate", "Bearer"));
        }
        response.json(json!({
            "detail": self.detail()
        }))
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
///
/// The underlying reason is deliberately dropped; callers only ever see
/// "Invalid credentials".
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::invalid_credentials()
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
///
/// This handles errors during password hashing or verification.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        let response = error.error_response();
        assert_eq!(response.status(), 401);
        assert!(response.headers().contains_key("WWW-Authenticate"));

        let error = AppError::BadRequest("Username already exists".into());
        let response = error.error_response();
        assert_eq!(response.status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        let response = error.error_response();
        assert_eq!(response.status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        let response = error.error_response();
        assert_eq!(response.status(), 500);

        let error = AppError::ValidationError("missing field".into());
        let response = error.error_response();
        assert_eq!(response.status(), 422);
    }

    #[actix_rt::test]
    async fn test_error_body_uses_detail_key() {
        let response = AppError::task_not_found().error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "detail": "Task not found" }));
    }

    #[test]
    fn test_jwt_errors_collapse_to_invalid_credentials() {
        let jwt_error: jsonwebtoken::errors::Error =
            jsonwebtoken::errors::ErrorKind::ExpiredSignature.into();
        assert_eq!(AppError::from(jwt_error), AppError::invalid_credentials());
    }
}
