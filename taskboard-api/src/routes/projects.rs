/// Project endpoints
///
/// # Endpoints
///
/// - `GET /api/projects` - List projects (`page`, `limit`, `name`)
/// - `GET /api/projects/:id` - Get one project with its tasks
/// - `POST /api/projects` - Create a project (session required)
/// - `PUT /api/projects/:id` - Update a project (session required)
/// - `DELETE /api/projects/:id` - Delete a project and its tasks (session required)

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{de, Deserialize, Deserializer};
use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;
use taskboard_shared::auth::AuthUser;
use taskboard_shared::models::project::{CreateProject, ProjectWithTasks, UpdateProject};
use taskboard_shared::services::ProjectQuery;
use validator::{Validate, ValidationError};

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ValidatedJson, ValidatedQuery},
    response::ApiResponse,
};

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(
        required(message = "Name is required"),
        custom(function = "validate_name")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<String>,
}

/// Update project request
///
/// A missing `description` leaves it unchanged; `"description": null`
/// clears it.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<Option<String>>,
}

/// List projects query
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, message = "Page must be greater than 0"))]
    pub page: Option<u32>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, message = "Limit must be greater than 0"))]
    pub limit: Option<u32>,

    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(invalid("length", "Name is required"));
    }
    if name.chars().count() > 200 {
        return Err(invalid("length", "Name must be less than 200 characters"));
    }
    Ok(())
}

pub(crate) fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Keeps an explicit `null` apart from a missing field
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parses a query value, treating `?page=` like a missing parameter
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

impl From<ProjectListQuery> for ProjectQuery {
    fn from(query: ProjectListQuery) -> Self {
        Self {
            page: query.page,
            limit: query.limit,
            name: query.name,
        }
    }
}

/// List projects, newest first, each with its tasks
pub async fn list_projects(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ProjectListQuery>,
) -> ApiResult<ApiResponse<Vec<ProjectWithTasks>>> {
    let page = state.projects.find_all(query.into()).await?;
    Ok(ApiResponse::page("Projects retrieved successfully", page))
}

/// Get one project
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<ProjectWithTasks>> {
    let project = state.projects.find_one(&id).await?;
    Ok(ApiResponse::ok("Project retrieved successfully", project))
}

/// Create a project
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: No valid session
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<ApiResponse<ProjectWithTasks>> {
    let project = state
        .projects
        .create(CreateProject {
            name: req.name.unwrap_or_default(),
            description: req.description,
        })
        .await?;

    tracing::info!(project_id = %project.project.id, user_id = %user.id, "Project created");
    Ok(ApiResponse::created("Project created successfully", project))
}

/// Update a project
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: Unknown project
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<ApiResponse<ProjectWithTasks>> {
    let project = state
        .projects
        .update(
            &id,
            UpdateProject {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    tracing::info!(project_id = %id, user_id = %user.id, "Project updated");
    Ok(ApiResponse::ok("Project updated successfully", project))
}

/// Delete a project and its tasks
///
/// # Errors
///
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: Unknown project
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    state.projects.delete(&id).await?;

    tracing::info!(project_id = %id, user_id = %user.id, "Project deleted");
    Ok(ApiResponse::empty("Project deleted successfully"))
}
