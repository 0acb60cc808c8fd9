//! Database layer
//!
//! - `pool`: PostgreSQL connection pool with a health check
//! - `migrations`: embedded schema migrations
//!
//! Queries live next to their models in [`crate::models`].

pub mod migrations;
pub mod pool;
