//! Health check endpoint
//!
//! ```text
//! GET /health
//!
//! 200 {"status": "healthy", "version": "0.1.0", "storage": "postgres"}
//! ```
//!
//! `status` is `degraded` when the database does not answer. The memory
//! backend is always healthy.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::db::pool;

use crate::app::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    /// Application version
    pub version: String,

    /// Storage backend in use
    pub storage: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = match &state.db {
        Some(db) => match pool::health_check(db).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        },
        None => true,
    };

    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.tasks.backend().to_string(),
    })
}
