//! Application state and router builder

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use taskdeck_shared::{
    auth::TokenCodec,
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    store::{
        MemoryTaskRepository, MemoryUserRepository, PgTaskRepository, PgUserRepository,
        TaskRepository, UserRepository,
    },
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::{Config, StorageBackend},
    middleware::{auth::require_auth, security::SecurityHeadersLayer},
    routes,
};

/// Shared application state
///
/// Immutable after start-up and cloned into every handler; all fields are
/// reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Credential store
    pub users: Arc<dyn UserRepository>,

    /// Owner-scoped task store
    pub tasks: Arc<dyn TaskRepository>,

    /// Issues and verifies bearer tokens
    pub tokens: Arc<TokenCodec>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Present only with the PostgreSQL backend
    pub db: Option<PgPool>,
}

impl AppState {
    /// Assembles state from already-built repositories
    ///
    /// Fails if the token codec cannot be built from the configured secret
    /// or lifetime.
    pub fn new(
        config: Config,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        db: Option<PgPool>,
    ) -> anyhow::Result<Self> {
        let ttl = chrono::Duration::try_hours(config.jwt.ttl_hours)
            .ok_or_else(|| anyhow::anyhow!("JWT_TTL_HOURS is out of range"))?;
        let tokens =
            TokenCodec::new(&config.jwt.secret, ttl).context("invalid token configuration")?;

        Ok(Self {
            users,
            tasks,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            db,
        })
    }

    /// State backed by fresh in-memory repositories
    pub fn in_memory(config: Config) -> anyhow::Result<Self> {
        Self::new(
            config,
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryTaskRepository::new()),
            None,
        )
    }

    /// Builds state for the configured storage backend
    ///
    /// With PostgreSQL this opens the pool, checks connectivity and, unless
    /// disabled, applies pending migrations.
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Self::in_memory(config)
            }
            StorageBackend::Postgres => {
                let pool = create_pool(&DatabaseConfig {
                    url: config.database.url.clone(),
                    max_connections: config.database.max_connections,
                    ..Default::default()
                })
                .await
                .context("failed to connect to PostgreSQL")?;

                if config.database.run_migrations {
                    run_migrations(&pool)
                        .await
                        .context("failed to run database migrations")?;
                }

                Self::new(
                    config,
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgTaskRepository::new(pool.clone())),
                    Some(pool),
                )
            }
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET    /health
/// ├── /auth
/// │   ├── POST /signup
/// │   └── POST /login
/// └── /tasks                 (bearer token required)
///     ├── GET    /
///     ├── POST   /
///     ├── PUT    /:id
///     └── DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
