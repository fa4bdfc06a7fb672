/// Project service
use std::sync::Arc;
use tracing::debug;

use crate::error::{Resource, ServiceError, ServiceResult};
use crate::models::project::{CreateProject, ProjectFilter, ProjectWithTasks, UpdateProject};
use crate::pagination::{Page, PageRequest, Pagination};
use crate::store::ProjectRepo;

/// List parameters; an empty `name` means no filter
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepo>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepo>) -> Self {
        Self { projects }
    }

    /// One page of projects, newest first, each with its tasks
    pub async fn find_all(&self, query: ProjectQuery) -> ServiceResult<Page<ProjectWithTasks>> {
        let page = PageRequest::new(query.page, query.limit);
        let filter = ProjectFilter {
            name: query.name.filter(|name| !name.is_empty()),
        };

        let (items, total) = tokio::try_join!(
            self.projects.list(&filter, page),
            self.projects.count(&filter)
        )?;

        Ok(Page {
            items,
            pagination: Pagination::new(page, total),
        })
    }

    pub async fn find_one(&self, id: &str) -> ServiceResult<ProjectWithTasks> {
        self.projects
            .find_with_tasks(id)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Project))
    }

    pub async fn create(&self, data: CreateProject) -> ServiceResult<ProjectWithTasks> {
        let project = self.projects.create(data).await?;
        debug!(project_id = %project.id, "Project created");
        Ok(ProjectWithTasks::new(project, Vec::new()))
    }

    /// Applies the present fields and returns the refreshed project
    pub async fn update(&self, id: &str, data: UpdateProject) -> ServiceResult<ProjectWithTasks> {
        self.ensure_exists(id).await?;

        self.projects
            .update(id, data)
            .await?
            .ok_or(ServiceError::NotFound(Resource::Project))?;

        debug!(project_id = %id, "Project updated");
        self.find_one(id).await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.ensure_exists(id).await?;

        if !self.projects.delete(id).await? {
            return Err(ServiceError::NotFound(Resource::Project));
        }

        debug!(project_id = %id, "Project deleted");
        Ok(())
    }

    async fn ensure_exists(&self, id: &str) -> ServiceResult<()> {
        match self.projects.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(Resource::Project)),
        }
    }
}
