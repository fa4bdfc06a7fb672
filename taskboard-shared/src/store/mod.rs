/// Storage traits and their implementations
///
/// Services and the auth layer talk to storage only through these traits, so
/// the same code runs against PostgreSQL in production and the in-memory
/// store in tests.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::store::Repositories;
/// use taskboard_shared::models::project::CreateProject;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let repos = Repositories::postgres(pool);
/// let project = repos.projects.create(CreateProject {
///     name: "Docs".to_string(),
///     description: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::project::{CreateProject, Project, ProjectFilter, ProjectWithTasks, UpdateProject};
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task, TaskFilter, TaskWithProject, UpdateTask};
use crate::models::user::{BanUpdate, CreateUser, User};
use crate::pagination::PageRequest;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn create(&self, data: CreateProject) -> StoreResult<Project>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Project>>;
    async fn find_with_tasks(&self, id: &str) -> StoreResult<Option<ProjectWithTasks>>;
    /// Newest first
    async fn list(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<ProjectWithTasks>>;
    async fn count(&self, filter: &ProjectFilter) -> StoreResult<i64>;
    /// `None` if the project does not exist
    async fn update(&self, id: &str, data: UpdateProject) -> StoreResult<Option<Project>>;
    /// Also removes the project's tasks. `false` if nothing was deleted.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskRepo: Send + Sync {
    /// Fails with [`StoreError::MissingReference`] if the project is gone
    async fn create(&self, data: CreateTask) -> StoreResult<TaskWithProject>;
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Task>>;
    async fn find_with_project(&self, id: &str) -> StoreResult<Option<TaskWithProject>>;
    /// Newest first
    async fn list(&self, filter: &TaskFilter, page: PageRequest)
        -> StoreResult<Vec<TaskWithProject>>;
    async fn count(&self, filter: &TaskFilter) -> StoreResult<i64>;
    /// `None` if the task does not exist
    async fn update(&self, id: &str, data: UpdateTask) -> StoreResult<Option<TaskWithProject>>;
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait AuthRepo: Send + Sync {
    /// Fails with [`StoreError::Conflict`] if the e-mail is taken (any case)
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;
    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// `None` if the user does not exist
    async fn set_user_role(&self, id: &str, role: Option<String>) -> StoreResult<Option<User>>;
    /// `None` if the user does not exist
    async fn set_user_ban(&self, id: &str, ban: BanUpdate) -> StoreResult<Option<User>>;
    async fn create_session(&self, data: CreateSession) -> StoreResult<Session>;
    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>>;
    async fn delete_session_by_token_hash(&self, token_hash: &str) -> StoreResult<bool>;
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64>;
}

/// Liveness probe for the backing store
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}

/// The set of repositories handed to services at startup
#[derive(Clone)]
pub struct Repositories {
    pub projects: Arc<dyn ProjectRepo>,
    pub tasks: Arc<dyn TaskRepo>,
    pub auth: Arc<dyn AuthRepo>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// Uses one store for every repository
    pub fn from_store<S>(store: S) -> Self
    where
        S: ProjectRepo + TaskRepo + AuthRepo + StoreHealth + 'static,
    {
        let store = Arc::new(store);
        Self {
            projects: store.clone(),
            tasks: store.clone(),
            auth: store.clone(),
            health: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(PgStore::new(pool))
    }

    pub fn in_memory() -> Self {
        Self::from_store(MemoryStore::new())
    }
}
