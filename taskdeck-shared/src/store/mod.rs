//! Persistence seams
//!
//! Handlers talk to storage only through [`UserRepository`] and
//! [`TaskRepository`]. Two backends implement them:
//!
//! - [`postgres`]: the production store, built on the queries in
//!   [`crate::models`]
//! - [`memory`]: process-local maps, used for tests and local demos
//!
//! Every task operation takes the owner's user ID. A task that exists but
//! belongs to someone else is reported exactly like a task that does not
//! exist.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{NewUser, Task, TaskFields, User};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record matched (including records owned by another user)
    #[error("Record not found")]
    NotFound,

    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing database failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; fails with [`StoreError::Conflict`] if the email is taken
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    /// Looks up a user by exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Short label for logs and the health endpoint
    fn backend(&self) -> &'static str;
}

/// Owner-scoped task store
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks owned by `owner`, oldest first
    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, StoreError>;

    /// Creates a task owned by `owner`
    async fn create(&self, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError>;

    /// Replaces all fields of the task `id` if `owner` owns it
    async fn update(&self, id: Uuid, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError>;

    /// Deletes the task `id` if `owner` owns it
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError>;

    /// Short label for logs and the health endpoint
    fn backend(&self) -> &'static str;
}
