//! Middleware for the API server
//!
//! - `auth`: the authentication gate in front of the task routes
//! - `security`: hardening response headers

pub mod auth;
pub mod security;
