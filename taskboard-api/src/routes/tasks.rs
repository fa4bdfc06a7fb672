/// Task endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks` - List tasks (`page`, `limit`, `projectId`, `status`, `title`)
/// - `GET /api/tasks/:id` - Get one task with its project
/// - `POST /api/tasks` - Create a task in an existing project (session required)
/// - `PUT /api/tasks/:id` - Update title and/or status (session required)
/// - `DELETE /api/tasks/:id` - Delete a task (session required)

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use taskboard_shared::auth::AuthUser;
use taskboard_shared::models::task::{TaskStatus, TaskWithProject, UpdateTask};
use taskboard_shared::services::{NewTask, TaskQuery};
use validator::{Validate, ValidationError};

use super::projects::{empty_as_none, invalid};
use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ValidatedJson, ValidatedQuery},
    response::ApiResponse,
};

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(
        required(message = "Project ID is required"),
        length(min = 1, message = "Project ID is required")
    )]
    pub project_id: Option<String>,

    #[validate(
        required(message = "Title is required"),
        custom(function = "validate_title")
    )]
    pub title: Option<String>,

    /// Defaults to `OPEN`
    pub status: Option<TaskStatus>,
}

/// Update task request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,

    pub status: Option<TaskStatus>,
}

/// List tasks query
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, message = "Page must be greater than 0"))]
    pub page: Option<u32>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, message = "Limit must be greater than 0"))]
    pub limit: Option<u32>,

    pub project_id: Option<String>,

    pub status: Option<TaskStatus>,

    /// Case-insensitive substring of the title
    pub title: Option<String>,
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(invalid("length", "Title is required"));
    }
    if title.chars().count() > 200 {
        return Err(invalid("length", "Title must be less than 200 characters"));
    }
    Ok(())
}

impl From<TaskListQuery> for TaskQuery {
    fn from(query: TaskListQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            project_id: query.project_id,
            status: query.status,
            title: query.title,
        }
    }
}

/// List tasks, newest first, each with its project
pub async fn list_tasks(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<TaskListQuery>,
) -> ApiResult<ApiResponse<Vec<TaskWithProject>>> {
    let page = state.tasks.find_all(query.into()).await?;
    Ok(ApiResponse::page("Tasks retrieved successfully", page))
}

/// Get one task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<TaskWithProject>> {
    let task = state.tasks.find_one(&id).await?;
    Ok(ApiResponse::ok("Task retrieved successfully", task))
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: The project does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<ApiResponse<TaskWithProject>> {
    let task = state
        .tasks
        .create(NewTask {
            project_id: req.project_id.unwrap_or_default(),
            title: req.title.unwrap_or_default(),
            status: req.status,
        })
        .await?;

    tracing::info!(
        task_id = %task.task.id,
        project_id = %task.task.project_id,
        user_id = %user.id,
        "Task created"
    );
    Ok(ApiResponse::created("Task created successfully", task))
}

/// Update a task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: Unknown task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<TaskWithProject>> {
    let task = state
        .tasks
        .update(
            &id,
            UpdateTask {
                title: req.title,
                status: req.status,
            },
        )
        .await?;

    tracing::info!(task_id = %id, user_id = %user.id, "Task updated");
    Ok(ApiResponse::ok("Task updated successfully", task))
}

/// Delete a task
///
/// # Errors
///
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: Unknown task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    state.tasks.delete(&id).await?;

    tracing::info!(task_id = %id, user_id = %user.id, "Task deleted");
    Ok(ApiResponse::empty("Task deleted successfully"))
}
