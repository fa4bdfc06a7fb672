/// Task service
use std::sync::Arc;
use tracing::debug;

use crate::error::{Resource, ServiceError, ServiceResult, StoreError};
use crate::models::task::{CreateTask, TaskFilter, TaskStatus, TaskWithProject, UpdateTask};
use crate::pagination::{Page, PageRequest, Pagination};
use crate::store::{ProjectRepo, TaskRepo};

/// List parameters; an empty `project_id` or `title` means no filter
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub project_id: Option<String>,
    pub status: Option<TaskStatus>,
    pub title: Option<String>,
}

/// Input for [`TaskService::create`]; `status` defaults to `OPEN`
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: String,
    pub title: String,
    pub status: Option<TaskStatus>,
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepo>,
    projects: Arc<dyn ProjectRepo>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepo>, projects: Arc<dyn ProjectRepo>) -> Self {
        Self { tasks, projects }
    }

    /// One page of tasks, newest first, each with its project
    pub async fn find_all(&self, query: TaskQuery) -> ServiceResult<Page<TaskWithProject>> {
        let page = PageRequest::new(query.page, query.limit);
        let filter = TaskFilter {
            project_id: query.project_id.filter(|id| !id.is_empty()),
            status: query.status,
            title: query.title.filter(|title| !title.is_empty()),
        };

        let (items, total) =
            tokio::try_join!(self.tasks.list(&filter, page), self.tasks.count(&filter))?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn find_one(&self, id: &str) -> ServiceResult<TaskWithProject> {
        self.tasks
            .find_with_project(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Task))
    }

    /// Creates a task under an existing project
    ///
    /// Nothing is written when the project does not exist.
    pub async fn create(&self, data: NewTask) -> ServiceResult<TaskWithProject> {
        if self.projects.find_by_id(&data.project_id).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::Project));
        }

        let created = self
            .tasks
            .create(CreateTask {
                project_id: data.project_id,
                title: data.title,
                status: data.status.unwrap_or_default(),
            })
            .await;

        match created {
            Ok(task) => {
                debug!(task_id = %task.task.id, project_id = %task.project.id, "Task created");
                Ok(task)
            }
            // Project deleted between the check and the insert
            Err(StoreError::MissingReference(_)) => Err(ServiceError::NotFound(Resource::Project)),
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the present fields, bumps `updatedAt` and returns the task
    pub async fn update(&self, id: &str, data: UpdateTask) -> ServiceResult<TaskWithProject> {
        if self.tasks.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::Task));
        }

        let task = self
            .tasks
            .update(id, data)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Task))?;

        debug!(task_id = %id, "Task updated");
        Ok(task)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if self.tasks.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound(Resource::Task));
        }

        if !self.tasks.delete(id).await? {
            return Err(ServiceError::NotFound(Resource::Task));
        }

        debug!(task_id = %id, "Task deleted");
        Ok(())
    }
}
