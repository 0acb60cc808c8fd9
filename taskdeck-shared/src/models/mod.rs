//! Database models
//!
//! - `user`: accounts created at signup
//! - `task`: per-user tasks, plus the input validation shared by create and update

pub mod task;
pub mod user;

pub use task::{Task, TaskFields, TaskInput, TaskPriority, TaskStatus};
pub use user::{NewUser, User};
