//! API route handlers
//!
//! - `health`: liveness and storage status
//! - `auth`: signup and login
//! - `tasks`: owner-scoped task CRUD

pub mod auth;
pub mod health;
pub mod tasks;
