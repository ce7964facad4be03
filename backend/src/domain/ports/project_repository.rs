//! Port for project persistence.
//!
//! Owner-scoped operations take the owner explicitly so adapters filter in
//! the query itself rather than after loading the row.

use async_trait::async_trait;

use crate::domain::{NewProject, Project, ProjectId, ProjectName, ProjectUid, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
        /// The generated external identifier collided with an existing one.
        DuplicateUid { uid: String } => "project uid already exists: {uid}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a project and return the stored record.
    async fn create(&self, project: &NewProject) -> Result<Project, ProjectPersistenceError>;

    /// Projects owned by `owner`, ordered by id ascending.
    async fn list_for_owner(&self, owner: &UserId)
    -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Project `id` when owned by `owner`.
    async fn find_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
    ) -> Result<Option<Project>, ProjectPersistenceError>;

    /// Project addressed by its external identifier, regardless of owner.
    async fn find_by_uid(&self, uid: ProjectUid)
    -> Result<Option<Project>, ProjectPersistenceError>;

    /// Rename project `id` when owned by `owner`.
    async fn rename_owned(
        &self,
        owner: &UserId,
        id: ProjectId,
        name: &ProjectName,
    ) -> Result<Option<Project>, ProjectPersistenceError>;

    /// Delete project `id` (and, by cascade, its keys and logs) when owned by
    /// `owner`. Returns whether a row was removed.
    async fn delete_owned(&self, owner: &UserId, id: ProjectId)
    -> Result<bool, ProjectPersistenceError>;
}
