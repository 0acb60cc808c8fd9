//! PostgreSQL-backed repositories

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TaskRepository, UserRepository};
use crate::models::{NewUser, Task, TaskFields, User};

/// Users table
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        User::create(&self.pool, user).await.map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict("User with this email already exists".to_string())
            }
            other => StoreError::Database(other),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Tasks table
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        Ok(Task::list_by_owner(&self.pool, owner).await?)
    }

    async fn create(&self, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        Ok(Task::create(&self.pool, owner, &fields).await?)
    }

    async fn update(&self, id: Uuid, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        Task::update_owned(&self.pool, id, owner, &fields)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        if Task::delete_owned(&self.pool, id, owner).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
