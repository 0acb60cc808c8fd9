//! Authentication gate
//!
//! Turns the raw `Authorization` header of an inbound request into an
//! authenticated user ID, or a rejection. Every task operation goes through
//! this gate; signup and login do not.
//!
//! The gate is framework-independent. The API crate mounts it as an axum
//! middleware in front of the task routes.

use uuid::Uuid;

use super::token::{Rejection, TokenCodec};

/// Error returned when a request cannot be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// No bearer token was presented
    #[error("No bearer token provided")]
    NoToken,

    /// A token was presented but failed verification
    #[error("Invalid token: {0}")]
    InvalidToken(Rejection),
}

impl GateError {
    /// Stable error code surfaced to clients
    pub fn code(&self) -> &'static str {
        match self {
            GateError::NoToken => "UNAUTHENTICATED_NO_TOKEN",
            GateError::InvalidToken(_) => "UNAUTHENTICATED_INVALID_TOKEN",
        }
    }
}

/// Extracts the token from a `Bearer <token>` header value
///
/// The scheme is matched case-insensitively. An absent header, another
/// scheme, or a blank token all yield `None`.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let header = header?.trim_start();
    let (scheme, token) = header.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticates a request from its `Authorization` header
///
/// The raw token is never logged; only the rejection reason is.
pub fn authenticate(header: Option<&str>, codec: &TokenCodec) -> Result<Uuid, GateError> {
    let token = bearer_token(header).ok_or_else(|| {
        tracing::debug!("request without bearer token");
        GateError::NoToken
    })?;

    let claims = codec.verify(token).map_err(|reason| {
        tracing::warn!(reason = %reason, "bearer token rejected");
        GateError::InvalidToken(reason)
    })?;

    Ok(claims.user_id)
}
