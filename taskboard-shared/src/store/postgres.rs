/// PostgreSQL store backed by the model CRUD methods
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{AuthRepo, ProjectRepo, StoreHealth, StoreResult, TaskRepo};
use crate::db::pool::health_check;
use crate::models::project::{CreateProject, Project, ProjectFilter, ProjectWithTasks, UpdateProject};
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task, TaskFilter, TaskWithProject, UpdateTask};
use crate::models::user::{BanUpdate, CreateUser, User};
use crate::pagination::PageRequest;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectRepo for PgStore {
    async fn create(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn find_with_tasks(&self, id: &str) -> StoreResult<Option<ProjectWithTasks>> {
        Ok(Project::find_with_tasks(&self.pool, id).await?)
    }

    async fn list(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<ProjectWithTasks>> {
        Ok(Project::list(&self.pool, filter, page).await?)
    }

    async fn count(&self, filter: &ProjectFilter) -> StoreResult<i64> {
        Ok(Project::count(&self.pool, filter).await?)
    }

    async fn update(&self, id: &str, data: UpdateProject) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, data).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl TaskRepo for PgStore {
    async fn create(&self, data: CreateTask) -> StoreResult<TaskWithProject> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn find_with_project(&self, id: &str) -> StoreResult<Option<TaskWithProject>> {
        Ok(Task::find_with_project(&self.pool, id).await?)
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<TaskWithProject>> {
        Ok(Task::list(&self.pool, filter, page).await?)
    }

    async fn count(&self, filter: &TaskFilter) -> StoreResult<i64> {
        Ok(Task::count(&self.pool, filter).await?)
    }

    async fn update(&self, id: &str, data: UpdateTask) -> StoreResult<Option<TaskWithProject>> {
        Ok(Task::update(&self.pool, id, data).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl AuthRepo for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn set_user_role(&self, id: &str, role: Option<String>) -> StoreResult<Option<User>> {
        Ok(User::set_role(&self.pool, id, role).await?)
    }

    async fn set_user_ban(&self, id: &str, ban: BanUpdate) -> StoreResult<Option<User>> {
        Ok(User::set_ban(&self.pool, id, ban).await?)
    }

    async fn create_session(&self, data: CreateSession) -> StoreResult<Session> {
        Ok(Session::create(&self.pool, data).await?)
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        Ok(Session::find_by_token_hash(&self.pool, token_hash).await?)
    }

    async fn delete_session_by_token_hash(&self, token_hash: &str) -> StoreResult<bool> {
        Ok(Session::delete_by_token_hash(&self.pool, token_hash).await?)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        Ok(Session::delete_expired(&self.pool, now).await?)
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
