//! Configuration management for the API server
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first when present) and validated once at start-up. Bad values abort
//! start-up instead of surfacing later as request failures.
//!
//! # Environment Variables
//!
//! - `API_HOST`: host to bind to (default: 0.0.0.0)
//! - `API_PORT`: port to bind to (default: 8080)
//! - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: `*`)
//! - `API_PRODUCTION`: enables HSTS (default: false)
//! - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
//! - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
//! - `DATABASE_RUN_MIGRATIONS`: apply migrations on start (default: true)
//! - `JWT_SECRET`: token signing secret, at least 32 bytes (required)
//! - `JWT_TTL_HOURS`: token lifetime (default: 24)
//! - `LOG_FORMAT`: `json` for JSON logs, anything else for text
//! - `RUST_LOG`: log filter

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::Context;

/// Minimum accepted length of `JWT_SECRET`, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Upper bound on `JWT_TTL_HOURS` (one year)
pub const MAX_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageBackend,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub log_format: LogFormat,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

/// Where users and tasks are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// PostgreSQL settings, used only with [`StorageBackend::Postgres`]
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL; empty with the memory backend
    pub url: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Apply pending migrations at start-up
    pub run_migrations: bool,
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Signing secret, at least [`MIN_SECRET_LEN`] bytes.
    /// Generate with `openssl rand -hex 32`.
    pub secret: String,

    /// Token lifetime in hours, in `1..=MAX_TTL_HOURS`
    pub ttl_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any variable
    /// has an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(var("API_PORT"), "API_PORT", 8080u16)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_flag(var("API_PRODUCTION"), "API_PRODUCTION", false)?;

        let storage = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::Postgres,
        };

        let database_url = var("DATABASE_URL").unwrap_or_default();
        if storage == StorageBackend::Postgres && database_url.is_empty() {
            anyhow::bail!("DATABASE_URL environment variable is required");
        }

        let max_connections = parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10u32)?;
        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        let run_migrations = parse_flag(var("DATABASE_RUN_MIGRATIONS"), "DATABASE_RUN_MIGRATIONS", true)?;

        let secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes long");
        }

        let ttl_hours = parse_or(var("JWT_TTL_HOURS"), "JWT_TTL_HOURS", 24i64)?;
        if !(1..=MAX_TTL_HOURS).contains(&ttl_hours) {
            anyhow::bail!("JWT_TTL_HOURS must be between 1 and {MAX_TTL_HOURS}");
        }

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            storage,
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
            jwt: JwtConfig { secret, ttl_hours },
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn cors_allows_any(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
        None => Ok(default),
    }
}

fn parse_flag(raw: Option<String>, key: &str, default: bool) -> anyhow::Result<bool> {
    let Some(value) = raw else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{key} must be a boolean, got '{value}'"),
    }
}
