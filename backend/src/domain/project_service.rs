//! Owner-scoped project management.

use std::sync::Arc;

use tracing::info;

use crate::domain::ports::{ProjectPersistenceError, ProjectRepository};
use crate::domain::{Error, NewProject, OwnerScope, Project, ProjectId, ProjectName, ProjectUid};

/// Creates, lists, renames and deletes the caller's projects.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }

    /// Create a project owned by the scoped user with a fresh external id.
    pub async fn create(&self, scope: &OwnerScope, name: ProjectName) -> Result<Project, Error> {
        let new_project = NewProject {
            uid: ProjectUid::random(),
            name,
            owner: *scope.user(),
        };
        let project = self
            .projects
            .create(&new_project)
            .await
            .map_err(map_project_error)?;
        info!(user_id = %scope.user(), project_id = %project.id(), "created project");
        Ok(project)
    }

    pub async fn list(&self, scope: &OwnerScope) -> Result<Vec<Project>, Error> {
        self.projects
            .list_for_owner(scope.user())
            .await
            .map_err(map_project_error)
    }

    pub async fn get(&self, scope: &OwnerScope, id: ProjectId) -> Result<Project, Error> {
        self.projects
            .find_owned(scope.user(), id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(project_not_found)
    }

    /// Apply an update. A missing name leaves the project unchanged.
    pub async fn update(
        &self,
        scope: &OwnerScope,
        id: ProjectId,
        name: Option<ProjectName>,
    ) -> Result<Project, Error> {
        let Some(name) = name else {
            return self.get(scope, id).await;
        };
        self.projects
            .rename_owned(scope.user(), id, &name)
            .await
            .map_err(map_project_error)?
            .ok_or_else(project_not_found)
    }

    /// Delete a project together with its keys and logs.
    pub async fn delete(&self, scope: &OwnerScope, id: ProjectId) -> Result<(), Error> {
        let removed = self
            .projects
            .delete_owned(scope.user(), id)
            .await
            .map_err(map_project_error)?;
        if !removed {
            return Err(project_not_found());
        }
        info!(user_id = %scope.user(), project_id = %id, "deleted project");
        Ok(())
    }
}

fn project_not_found() -> Error {
    Error::not_found("project not found")
}

pub(crate) fn map_project_error(error: ProjectPersistenceError) -> Error {
    match error {
        ProjectPersistenceError::Connection { message } => Error::service_unavailable(message),
        ProjectPersistenceError::Query { message } => Error::internal(message),
        ProjectPersistenceError::DuplicateUid { .. } => {
            Error::conflict("a project with that identifier already exists")
        }
    }
}
