//! Authentication endpoints
//!
//! - `POST /auth/signup`: create an account and get a token
//! - `POST /auth/login`: exchange credentials for a token
//!
//! Neither route sits behind the authentication gate; they are how a client
//! obtains a token in the first place.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::password::{hash_password, verify_dummy, verify_password},
    models::{NewUser, User},
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Signup request
///
/// Fields are optional so that a missing field is reported as a validation
/// error rather than a JSON parse failure.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(
        required(message = "Username is required"),
        length(min = 1, message = "Username is required")
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Email is required"),
        length(min = 1, message = "Email is required")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Password is required"),
        length(min = 1, message = "Password is required")
    )]
    pub password: Option<String>,
}

/// Body returned by both signup and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,

    /// Bearer token for the task endpoints
    pub token: String,

    /// The account, without its password hash
    pub user: User,
}

/// Creates an account
///
/// ```text
/// POST /auth/signup
/// {"username": "ada", "email": "ada@example.com", "password": "..."}
///
/// 201 {"message": "User created successfully", "token": "eyJ...", "user": {...}}
/// ```
///
/// # Errors
///
/// - `400 VALIDATION_ERROR`: a field is missing or empty
/// - `400 CONFLICT`: the email is already registered
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    let username = req.username.unwrap_or_default();
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    if state.users.find_by_email(&email).await?.is_some() {
        warn!("Signup rejected: email already registered");
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_blocking(password).await?;

    let user = state
        .users
        .create(NewUser {
            email,
            username,
            password_hash,
        })
        .await?;

    let token = state.tokens.issue(user.id)?;

    info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            token,
            user,
        }),
    ))
}

/// Logs in with email and password
///
/// ```text
/// POST /auth/login
/// {"email": "ada@example.com", "password": "..."}
///
/// 200 {"message": "Login successful", "token": "eyJ...", "user": {...}}
/// ```
///
/// An unknown email and a wrong password produce the same
/// `400 INVALID_CREDENTIALS` response.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let Some(user) = state.users.find_by_email(&email).await? else {
        // Same Argon2 cost as a wrong password
        verify_dummy_blocking(password).await?;
        warn!("Login failed: unknown email");
        return Err(ApiError::BadCredentials);
    };

    if !verify_blocking(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::BadCredentials);
    }

    let token = state.tokens.issue(user.id)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

// Hashing runs on the blocking pool; it takes tens of milliseconds of CPU.
async fn hash_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn verify_dummy_blocking(password: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_dummy(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password task failed: {e}")))?
        .map_err(ApiError::from)
}
