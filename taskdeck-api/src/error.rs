//! Error handling for the API server
//!
//! Handlers return [`ApiResult`]; every failure becomes a JSON body of the
//! form `{"error": CODE, "message": text, "details"?: [...]}` with the
//! matching status code. Library errors convert through `From`, so `?` works
//! in handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{password::PasswordError, GateError, TokenError},
    store::StoreError,
};
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body failed validation (400)
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<ValidationErrorDetail>),

    /// Unknown email or wrong password (400)
    #[error("Invalid credentials")]
    BadCredentials,

    /// Duplicate record, e.g. an email that is already registered (400)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rejected by the authentication gate (401)
    #[error("Unauthenticated: {0}")]
    Unauthenticated(GateError),

    /// No such record for this caller (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything else (500); the detail is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code, e.g. `VALIDATION_ERROR`
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// A single validation failure on one field
    pub fn invalid_field(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadCredentials | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadCredentials => "INVALID_CREDENTIALS",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unauthenticated(gate) => gate.code(),
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::Validation(errors) => ("Request validation failed".to_string(), Some(errors)),
            ApiError::BadCredentials => ("Invalid user credentials".to_string(), None),
            ApiError::Conflict(msg) | ApiError::NotFound(msg) => (msg, None),
            ApiError::Unauthenticated(GateError::NoToken) => {
                ("Unauthorized: No token provided".to_string(), None)
            }
            ApiError::Unauthenticated(GateError::InvalidToken(_)) => {
                ("Unauthorized: Invalid token".to_string(), None)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("Internal server error".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Task not found".to_string()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(e) => ApiError::Internal(format!("Database error: {e}")),
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::Unauthenticated(err)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Internal(format!("Token issuance failed: {err}"))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {err}"))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {field}")),
                })
            })
            .collect();

        // HashMap order is unstable
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::Validation(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_field("body", &rejection.body_text())
    }
}
