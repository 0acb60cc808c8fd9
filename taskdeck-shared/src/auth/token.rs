//! Bearer token codec
//!
//! Issues and verifies the signed tokens handed out at signup/login and
//! presented on every task request.
//!
//! # Format
//!
//! HS256 JWT carrying:
//!
//! - `userId`: authenticated user ID
//! - `iat`: issued at (Unix seconds)
//! - `exp`: expiration (Unix seconds), `iat + ttl`
//! - `iss`: always `"taskdeck"`
//!
//! Verification is stateless. There is no refresh and no revocation; an
//! expired token forces the user to log in again.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issuer stamped into and required from every token
pub const ISSUER: &str = "taskdeck";

/// Default token lifetime
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The signing secret is empty
    #[error("Token signing secret must not be empty")]
    MissingSecret,

    /// Failed to sign a token
    #[error("Failed to create token: {0}")]
    CreateError(String),
}

/// Why a presented token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not a decodable token, or its claims are unusable
    Malformed,

    /// Signature does not match the process secret
    SignatureInvalid,

    /// `exp` is in the past
    Expired,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Malformed => "MALFORMED",
            Rejection::SignatureInvalid => "SIGNATURE_INVALID",
            Rejection::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for Rejection {}

/// Verified token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user ID
    #[serde(rename = "userId")]
    pub user_id: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

impl Claims {
    fn new(user_id: Uuid, ttl: Duration) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::CreateError("expiry out of range".to_string()))?;

        Ok(Self {
            user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: ISSUER.to_string(),
        })
    }

    /// Checks if the claim has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Signs and verifies bearer tokens with a process-wide secret
///
/// Built once at start-up from configuration and shared read-only by every
/// request.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec for `secret`, issuing tokens valid for `ttl`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::MissingSecret` if the secret is empty.
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        })
    }

    /// Creates a codec with the default 24 hour lifetime
    pub fn with_default_ttl(secret: &str) -> Result<Self, TokenError> {
        Self::new(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// Issues a token for `user_id`
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, self.ttl)?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(e.to_string()))?;

        tracing::debug!(user_id = %user_id, exp = claims.exp, "token issued");
        Ok(token)
    }

    /// Verifies signature, issuer and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, Rejection> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => Rejection::Expired,
                ErrorKind::InvalidSignature => Rejection::SignatureInvalid,
                _ => Rejection::Malformed,
            }
        })?;

        Ok(data.claims)
    }
}
