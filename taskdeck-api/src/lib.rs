//! # TaskDeck API Server Library
//!
//! JSON HTTP API for signing up, logging in, and managing per-user tasks.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: environment configuration
//! - `error`: error handling and HTTP response mapping
//! - `middleware`: authentication gate and security headers
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
