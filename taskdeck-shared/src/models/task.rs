//! Task model and database operations
//!
//! Every query here takes the owner's user ID and filters on it; there is no
//! way to read or change a task without naming its owner.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE task_status AS ENUM ('TO_DO', 'IN_PROGRESS', 'DONE');
//! CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
//!
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     title TEXT NOT NULL CHECK (title <> ''),
//!     description TEXT,
//!     status task_status NOT NULL DEFAULT 'TO_DO',
//!     priority task_priority NOT NULL DEFAULT 'MEDIUM',
//!     due_date DATE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

/// Workflow column of a task (the kanban board's lanes)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "TO_DO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TO_DO" => Ok(TaskStatus::ToDo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no enum variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

/// A task owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,

    /// Owner; every query filters on this
    pub user_id: Uuid,

    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,

    /// Calendar date only; `None` means no due date
    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, writable task fields
///
/// Used for both create and update. Update is a full replacement: every
/// field here overwrites the stored one, including `None`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// Task payload as sent by clients, before validation
///
/// Everything is optional at this stage so that missing or mistyped
/// fields surface as field-level validation errors instead of an opaque
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
}

impl TaskInput {
    /// Validates the payload into [`TaskFields`]
    ///
    /// - `title` must be present and not blank; it is stored as sent
    /// - `status` / `priority` default to `TO_DO` / `MEDIUM` when absent or
    ///   empty; unknown spellings are rejected
    /// - `dueDate` accepts `YYYY-MM-DD` or an RFC 3339 timestamp and keeps
    ///   only the calendar date; absent or empty means no due date
    pub fn into_fields(self) -> Result<TaskFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = match self.title {
            Some(title) if !title.trim().is_empty() => title,
            _ => {
                errors.add("title", field_error("required", "Title is required"));
                String::new()
            }
        };

        let status = match non_empty(self.status.as_deref()) {
            None => TaskStatus::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.add(
                    "status",
                    field_error("enum", "Status must be one of TO_DO, IN_PROGRESS, DONE"),
                );
                TaskStatus::default()
            }),
        };

        let priority = match non_empty(self.priority.as_deref()) {
            None => TaskPriority::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.add(
                    "priority",
                    field_error("enum", "Priority must be one of LOW, MEDIUM, HIGH"),
                );
                TaskPriority::default()
            }),
        };

        let due_date = match non_empty(self.due_date.as_deref()) {
            None => None,
            Some(raw) => parse_due_date(raw).or_else(|| {
                errors.add(
                    "dueDate",
                    field_error("date", "Due date must be an ISO date (YYYY-MM-DD)"),
                );
                None
            }),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TaskFields {
            title,
            description: self.description,
            status,
            priority,
            due_date,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Normalizes an ISO date or RFC 3339 timestamp to a calendar date
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, created_at, updated_at";

impl Task {
    /// Inserts a task owned by `owner`
    pub async fn create(
        pool: &PgPool,
        owner: Uuid,
        fields: &TaskFields,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO tasks (user_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(owner)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.status)
            .bind(fields.priority)
            .bind(fields.due_date)
            .fetch_one(pool)
            .await
    }

    /// Lists every task owned by `owner`, oldest first
    pub async fn list_by_owner(pool: &PgPool, owner: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await
    }

    /// Replaces all writable fields of a task, if `owner` owns it
    ///
    /// Returns `None` when no task has both this ID and this owner.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        owner: Uuid,
        fields: &TaskFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                status = $5,
                priority = $6,
                due_date = $7,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(owner)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.status)
            .bind(fields.priority)
            .bind(fields.due_date)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a task if `owner` owns it
    ///
    /// Returns false when zero rows matched.
    pub async fn delete_owned(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
