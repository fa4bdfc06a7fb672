/// Project model and database operations
///
/// A project owns zero or more tasks. Deleting a project removes its tasks
/// through the foreign key cascade.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id TEXT PRIMARY KEY,
///     name VARCHAR(200) NOT NULL,
///     description VARCHAR(1000),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::project::{CreateProject, Project};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Website relaunch".to_string(),
///     description: None,
/// }).await?;
///
/// let found = Project::find_by_id(&pool, &project.id).await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::contains_pattern;
use super::task::Task;
use crate::pagination::PageRequest;

/// Project row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Opaque identifier (UUID v4 text)
    pub id: String,

    /// Display name, 1-200 characters
    pub name: String,

    /// Optional free text, at most 1000 characters
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Project together with its tasks, newest task first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithTasks {
    #[serde(flatten)]
    pub project: Project,

    pub tasks: Vec<Task>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update for a project
///
/// `None` leaves a field untouched. `description: Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        match &self.name {
            Some(needle) => project
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(name) = &self.name {
            qb.push(" AND name ILIKE ").push_bind(contains_pattern(name));
        }
    }
}

impl ProjectWithTasks {
    pub fn new(project: Project, tasks: Vec<Task>) -> Self {
        Self { project, tasks }
    }
}

impl Project {
    /// Inserts a new project and returns the stored row
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project and loads its tasks
    pub async fn find_with_tasks(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<ProjectWithTasks>, sqlx::Error> {
        let Some(project) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let tasks = Task::list_for_projects(pool, &[project.id.clone()]).await?;
        Ok(Some(ProjectWithTasks::new(project, tasks)))
    }

    /// Lists one page of projects (newest first) with their tasks
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<Vec<ProjectWithTasks>, sqlx::Error> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT id, name, description, created_at FROM projects");
        filter.push_where(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let projects = qb.build_query_as::<Project>().fetch_all(pool).await?;
        if projects.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = projects.iter().map(|p| p.id.clone()).collect();
        let mut by_project: HashMap<String, Vec<Task>> = HashMap::new();
        for task in Task::list_for_projects(pool, &ids).await? {
            by_project.entry(task.project_id.clone()).or_default().push(task);
        }

        Ok(projects
            .into_iter()
            .map(|project| {
                let tasks = by_project.remove(&project.id).unwrap_or_default();
                ProjectWithTasks::new(project, tasks)
            })
            .collect())
    }

    /// Counts projects matching the filter
    pub async fn count(pool: &PgPool, filter: &ProjectFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM projects");
        filter.push_where(&mut qb);

        let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }

    /// Applies the fields present in `data`
    ///
    /// Returns `None` if the project does not exist.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET id = id");

        if let Some(name) = data.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = data.description {
            qb.push(", description = ").push_bind(description);
        }

        qb.push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(" RETURNING id, name, description, created_at");

        let project = qb.build_query_as::<Project>().fetch_optional(pool).await?;
        Ok(project)
    }

    /// Deletes a project (and, by cascade, its tasks)
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
