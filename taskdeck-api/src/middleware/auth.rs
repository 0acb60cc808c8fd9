//! Authentication gate middleware
//!
//! Mounted once on the `/tasks` router. Requests that fail the gate are
//! answered with 401 here and never reach a handler or a repository.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use taskdeck_shared::auth::authenticate;
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// Identity of the caller, inserted into request extensions by [`require_auth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
}

/// Verifies the bearer token and injects [`AuthContext`]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user_id = authenticate(header, &state.tokens)?;

    req.extensions_mut().insert(AuthContext { user_id });

    Ok(next.run(req).await)
}
