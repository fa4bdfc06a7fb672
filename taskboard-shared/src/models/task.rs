/// Task model and database operations
///
/// A task always belongs to a project. Its status moves freely between the
/// three values; there is no enforced state machine.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('OPEN', 'IN_PROGRESS', 'DONE');
///
/// CREATE TABLE tasks (
///     id TEXT PRIMARY KEY,
///     project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     status task_status NOT NULL DEFAULT 'OPEN',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{CreateTask, Task, TaskStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, project_id: String) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     title: "Write release notes".to_string(),
///     status: TaskStatus::Open,
/// }).await?;
///
/// println!("{} belongs to {}", task.task.id, task.project.name);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::contains_pattern;
use super::project::Project;
use crate::pagination::PageRequest;

/// Task status
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Open,

    /// Someone is working on it
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

/// Task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Title, 1-200 characters
    pub title: String,

    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,

    /// Bumped on every update
    pub updated_at: DateTime<Utc>,
}

/// Task together with its owning project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithProject {
    #[serde(flatten)]
    pub task: Task,

    pub project: Project,
}

/// Input for creating a task, defaults already applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: String,
    pub title: String,
    pub status: TaskStatus,
}

/// Partial update for a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Exact project match
    pub project_id: Option<String>,

    /// Exact status match
    pub status: Option<TaskStatus>,

    /// Case-insensitive substring of the title
    pub title: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(project_id) = &self.project_id {
            if &task.project_id != project_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if !task.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        true
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if let Some(project_id) = &self.project_id {
            qb.push(" AND t.project_id = ").push_bind(project_id.clone());
        }
        if let Some(status) = self.status {
            qb.push(" AND t.status = ").push_bind(status);
        }
        if let Some(title) = &self.title {
            qb.push(" AND t.title ILIKE ").push_bind(contains_pattern(title));
        }
    }
}

/// Columns selected for a task joined with its project (aliases `t` and `p`)
const JOINED_COLUMNS: &str = "t.id, t.project_id, t.title, t.status, t.created_at, t.updated_at, \
     p.name AS project_name, p.description AS project_description, \
     p.created_at AS project_created_at";

/// Flat row produced by the task/project join
#[derive(Debug, sqlx::FromRow)]
struct JoinedRow {
    id: String,
    project_id: String,
    title: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    project_name: String,
    project_description: Option<String>,
    project_created_at: DateTime<Utc>,
}

impl From<JoinedRow> for TaskWithProject {
    fn from(row: JoinedRow) -> Self {
        TaskWithProject {
            project: Project {
                id: row.project_id.clone(),
                name: row.project_name,
                description: row.project_description,
                created_at: row.project_created_at,
            },
            task: Task {
                id: row.id,
                project_id: row.project_id,
                title: row.title,
                status: row.status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

impl Task {
    /// Inserts a task and returns it joined with its project
    ///
    /// Fails with a foreign key violation if the project does not exist.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<TaskWithProject, sqlx::Error> {
        let row = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            WITH t AS (
                INSERT INTO tasks (id, project_id, title, status)
                VALUES ($1, $2, $3, $4)
                RETURNING id, project_id, title, status, created_at, updated_at
            )
            SELECT {JOINED_COLUMNS}
            FROM t
            JOIN projects p ON p.id = t.project_id
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, status, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task joined with its project
    pub async fn find_with_project(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<TaskWithProject>, sqlx::Error> {
        let row = sqlx::query_as::<_, JoinedRow>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Lists one page of tasks (newest first) with their projects
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> Result<Vec<TaskWithProject>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {JOINED_COLUMNS} FROM tasks t JOIN projects p ON p.id = t.project_id"
        ));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build_query_as::<JoinedRow>().fetch_all(pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Counts tasks matching the filter
    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks t");
        filter.push_where(&mut qb);

        let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }

    /// Lists the tasks of the given projects, newest first
    pub async fn list_for_projects(
        pool: &PgPool,
        project_ids: &[String],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, status, created_at, updated_at
            FROM tasks
            WHERE project_id = ANY($1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(project_ids)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies the fields present in `data` and bumps `updated_at`
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        data: UpdateTask,
    ) -> Result<Option<TaskWithProject>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("WITH t AS (UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = data.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(status) = data.status {
            qb.push(", status = ").push_bind(status);
        }

        qb.push(" WHERE id = ").push_bind(id.to_string());
        qb.push(format!(
            " RETURNING id, project_id, title, status, created_at, updated_at) \
             SELECT {JOINED_COLUMNS} FROM t JOIN projects p ON p.id = t.project_id"
        ));

        let row = qb.build_query_as::<JoinedRow>().fetch_optional(pool).await?;
        Ok(row.map(Into::into))
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
