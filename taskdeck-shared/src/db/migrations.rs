//! Schema migrations
//!
//! The SQL files under `taskdeck-shared/migrations/` are embedded into the
//! binary at compile time. Applied versions are tracked in
//! `_sqlx_migrations`, so running them on every start is idempotent.

use sqlx::postgres::PgPool;
use tracing::{error, info};

/// Applies all pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Migration failed");
            e
        })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Number of successfully applied migrations
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
}
