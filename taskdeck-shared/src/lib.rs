//! # TaskDeck Shared Library
//!
//! Types and business logic shared by the TaskDeck API server and its tests.
//!
//! ## Module Organization
//!
//! - `auth`: bearer tokens, the authentication gate, password hashing
//! - `db`: PostgreSQL pool and migrations
//! - `models`: users and tasks, with their SQL
//! - `store`: repository traits plus PostgreSQL and in-memory backends

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
