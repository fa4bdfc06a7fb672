/// In-memory store
///
/// Mirrors the PostgreSQL constraints that the services rely on: the
/// case-insensitive e-mail uniqueness, the task → project foreign key and the
/// cascade from projects to tasks. Used by the test suites.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{AuthRepo, ProjectRepo, StoreHealth, StoreResult, TaskRepo};
use crate::error::StoreError;
use crate::models::project::{CreateProject, Project, ProjectFilter, ProjectWithTasks, UpdateProject};
use crate::models::session::{CreateSession, Session};
use crate::models::task::{CreateTask, Task, TaskFilter, TaskWithProject, UpdateTask};
use crate::models::user::{BanUpdate, CreateUser, User};
use crate::pagination::PageRequest;

#[derive(Debug, Default)]
struct State {
    // Insertion order; listing reverses it
    projects: Vec<Project>,
    tasks: Vec<Task>,
    users: Vec<User>,
    sessions: HashMap<String, Session>,
}

impl State {
    fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    fn tasks_of(&self, project_id: &str) -> Vec<Task> {
        newest_first(
            self.tasks.iter().filter(|t| t.project_id == project_id),
            |t: &Task| t.created_at,
        )
    }

    fn with_tasks(&self, project: &Project) -> ProjectWithTasks {
        ProjectWithTasks::new(project.clone(), self.tasks_of(&project.id))
    }

    fn with_project(&self, task: &Task) -> Option<TaskWithProject> {
        self.project(&task.project_id).map(|project| TaskWithProject {
            task: task.clone(),
            project: project.clone(),
        })
    }
}

/// Sorts newest first; ties keep reverse insertion order
fn newest_first<'a, T, I, F>(items: I, created_at: F) -> Vec<T>
where
    T: Clone + 'a,
    I: DoubleEndedIterator<Item = &'a T>,
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut items: Vec<T> = items.rev().cloned().collect();
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
        .collect()
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProjectRepo for MemoryStore {
    async fn create(&self, data: CreateProject) -> StoreResult<Project> {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            created_at: Utc::now(),
        };
        self.write().projects.push(project.clone());
        Ok(project)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Project>> {
        Ok(self.read().project(id).cloned())
    }

    async fn find_with_tasks(&self, id: &str) -> StoreResult<Option<ProjectWithTasks>> {
        let state = self.read();
        Ok(state.project(id).map(|p| state.with_tasks(p)))
    }

    async fn list(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<ProjectWithTasks>> {
        let state = self.read();
        let projects = newest_first(
            state.projects.iter().filter(|p| filter.matches(p)),
            |p: &Project| p.created_at,
        );
        Ok(paginate(projects, page)
            .iter()
            .map(|p| state.with_tasks(p))
            .collect())
    }

    async fn count(&self, filter: &ProjectFilter) -> StoreResult<i64> {
        let state = self.read();
        Ok(state.projects.iter().filter(|p| filter.matches(p)).count() as i64)
    }

    async fn update(&self, id: &str, data: UpdateProject) -> StoreResult<Option<Project>> {
        let mut state = self.write();
        let Some(project) = state.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            project.name = name;
        }
        if let Some(description) = data.description {
            project.description = description;
        }
        Ok(Some(project.clone()))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.write();
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Ok(false);
        }
        state.tasks.retain(|t| t.project_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskRepo for MemoryStore {
    async fn create(&self, data: CreateTask) -> StoreResult<TaskWithProject> {
        let mut state = self.write();
        let Some(project) = state.project(&data.project_id).cloned() else {
            return Err(StoreError::MissingReference("tasks_project_id_fkey".to_string()));
        };

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            project_id: data.project_id,
            title: data.title,
            status: data.status,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(TaskWithProject { task, project })
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Task>> {
        Ok(self.read().tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn find_with_project(&self, id: &str) -> StoreResult<Option<TaskWithProject>> {
        let state = self.read();
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| state.with_project(t)))
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> StoreResult<Vec<TaskWithProject>> {
        let state = self.read();
        let tasks = newest_first(
            state.tasks.iter().filter(|t| filter.matches(t)),
            |t: &Task| t.created_at,
        );
        Ok(paginate(tasks, page)
            .iter()
            .filter_map(|t| state.with_project(t))
            .collect())
    }

    async fn count(&self, filter: &TaskFilter) -> StoreResult<i64> {
        let state = self.read();
        Ok(state.tasks.iter().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn update(&self, id: &str, data: UpdateTask) -> StoreResult<Option<TaskWithProject>> {
        let mut state = self.write();
        let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(title) = data.title {
            task.title = title;
        }
        if let Some(status) = data.status {
            task.status = status;
        }
        task.updated_at = Utc::now();

        let task = task.clone();
        Ok(state.with_project(&task))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.write();
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        Ok(state.tasks.len() != before)
    }
}

#[async_trait]
impl AuthRepo for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut state = self.write();
        if state
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: data.email,
            email_verified: false,
            name: data.name,
            image: data.image,
            role: None,
            banned: false,
            ban_reason: None,
            ban_expires: None,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn set_user_role(&self, id: &str, role: Option<String>) -> StoreResult<Option<User>> {
        let mut state = self.write();
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        user.role = role;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_user_ban(&self, id: &str, ban: BanUpdate) -> StoreResult<Option<User>> {
        let mut state = self.write();
        let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        user.banned = ban.banned;
        user.ban_reason = ban.reason;
        user.ban_expires = ban.expires;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn create_session(&self, data: CreateSession) -> StoreResult<Session> {
        let mut state = self.write();
        if !state.users.iter().any(|u| u.id == data.user_id) {
            return Err(StoreError::MissingReference("sessions_user_id_fkey".to_string()));
        }
        if state.sessions.contains_key(&data.token_hash) {
            return Err(StoreError::Conflict("sessions_token_hash_key".to_string()));
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            token_hash: data.token_hash,
            user_id: data.user_id,
            expires_at: data.expires_at,
            ip_address: data.ip_address,
            user_agent: data.user_agent,
            created_at: now,
            updated_at: now,
        };
        state
            .sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(session)
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        Ok(self.read().sessions.get(token_hash).cloned())
    }

    async fn delete_session_by_token_hash(&self, token_hash: &str) -> StoreResult<bool> {
        Ok(self.write().sessions.remove(token_hash).is_some())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut state = self.write();
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
