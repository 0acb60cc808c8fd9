//! Task endpoints
//!
//! All routes here sit behind the authentication gate and act only on the
//! caller's own tasks. Another user's task is indistinguishable from a task
//! that does not exist: both are `404 NOT_FOUND`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::models::{Task, TaskInput};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthContext,
};

/// Body returned by a successful delete
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// `GET /tasks`: the caller's tasks, oldest first
#[instrument(skip(state), fields(user_id = %auth.user_id))]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.tasks.list(auth.user_id).await?;
    Ok(Json(tasks))
}

/// `POST /tasks`: creates a task owned by the caller
///
/// ```text
/// {"title": "Write spec", "description": null, "status": "TO_DO",
///  "priority": "HIGH", "dueDate": "2024-05-01"}
/// ```
///
/// Only `title` is required. Returns `201` with the stored task.
#[instrument(skip(state, payload), fields(user_id = %auth.user_id))]
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = payload?;
    let fields = input.into_fields()?;

    let task = state.tasks.create(auth.user_id, fields).await?;

    info!(task_id = %task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /tasks/:id`: replaces every field of one of the caller's tasks
///
/// Fields left out of the body are reset (description and due date to
/// none, status and priority to their defaults).
#[instrument(skip(state, payload), fields(user_id = %auth.user_id))]
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    let Json(input) = payload?;
    let fields = input.into_fields()?;

    let task = state.tasks.update(task_id, auth.user_id, fields).await?;

    info!(task_id = %task.id, "Task updated");
    Ok(Json(task))
}

/// `DELETE /tasks/:id`: deletes one of the caller's tasks
#[instrument(skip(state), fields(user_id = %auth.user_id))]
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let task_id = parse_task_id(&id)?;

    state.tasks.delete(task_id, auth.user_id).await?;

    info!(task_id = %task_id, "Task deleted");
    Ok(Json(DeleteResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// A malformed ID can't name any task, so it is a 404 like any unknown ID
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}
