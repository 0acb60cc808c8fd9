//! In-memory repositories
//!
//! State lives for the life of the process. Selected with
//! `STORAGE_BACKEND=memory`; the API's HTTP tests run against it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskRepository, UserRepository};
use crate::models::{NewUser, Task, TaskFields, User};

/// Users keyed by email
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.email) {
            return Err(StoreError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(created.email.clone(), created.clone());

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Tasks in insertion order
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn list(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.user_id == owner).cloned().collect())
    }

    async fn create(&self, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: owner,
            title: fields.title,
            description: fields.description,
            status: fields.status,
            priority: fields.priority,
            due_date: fields.due_date,
            created_at: now,
            updated_at: now,
        };

        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: Uuid, owner: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
            .ok_or(StoreError::NotFound)?;

        task.title = fields.title;
        task.description = fields.description;
        task.status = fields.status;
        task.priority = fields.priority;
        task.due_date = fields.due_date;
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().await;
        let index = tasks
            .iter()
            .position(|t| t.id == id && t.user_id == owner)
            .ok_or(StoreError::NotFound)?;

        tasks.remove(index);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
